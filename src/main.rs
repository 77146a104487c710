use anyhow::Context;
use myshell::Interpreter;
use myshell::config::{Args, Config};
use myshell::lexer::TokenTable;
use myshell::prompt;
use std::fs::File;
use std::io::{self, BufReader};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config = Config::from(argh::from_env::<Args>());

    let batch = match &config.batch_file {
        Some(path) => Some(BufReader::new(
            File::open(path).with_context(|| format!("cannot open batch file {}", path.display()))?,
        )),
        None => None,
    };

    if config.banner {
        print!("{}", prompt::BANNER);
    }

    let mut shell = Interpreter::new(config.environment(), TokenTable::default());
    let mut stdout = io::stdout();
    match batch {
        Some(script) => shell.run_script(script, &mut stdout),
        None => shell.repl(&mut stdout),
    }
}
