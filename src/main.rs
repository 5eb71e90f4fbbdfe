use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use rusty_frames::data::loader::load_file;
use rusty_frames::{Conf, head, pivot};

const USAGE: &str = "usage: rusty-frames <file.csv|file.json> [pivot <row-key> <column-key> <value>]";

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(path) = args.first().map(PathBuf::from) else {
        bail!(USAGE);
    };

    let dataset = load_file(&path).with_context(|| format!("loading {}", path.display()))?;
    log::info!(
        "loaded {}: {} rows x {} columns",
        path.display(),
        dataset.len(),
        dataset.columns().len()
    );

    match args.get(1).map(String::as_str) {
        None => {
            let conf = Conf::from_env();
            println!("{}", head(&dataset, &conf));
        }
        Some("pivot") => {
            let [row_key, column_key, value] = match &args[2..] {
                [r, c, v] => [r, c, v],
                _ => bail!(USAGE),
            };
            let wide = pivot(&dataset, row_key, column_key, value)?;
            println!("{wide}");
        }
        Some(other) => bail!("unknown command {other:?}\n{USAGE}"),
    }
    Ok(())
}
