use clap::Parser;
use log::kv::{ToValue, Value};

#[derive(Parser, Debug, PartialEq)]
#[command(version, about = "Compare CRUD operation cost across database access backends")]
pub struct CliArgs {
    /// Operation to benchmark, or "all" for every registered operation.
    #[arg(short, long, default_value = "select-one")]
    pub operation: String,
    #[arg(short, long)]
    pub config: Option<String>,
    /// Restrict the run to these backends (repeatable).
    #[arg(short, long = "backend")]
    pub backends: Vec<String>,
    /// Fix the shuffle seed instead of deriving one from the clock.
    #[arg(long)]
    pub seed: Option<u64>,
    /// Print registered backends and operations, then exit.
    #[arg(long)]
    pub list: bool,
}

impl ToValue for CliArgs {
    fn to_value(&self) -> Value<'_> {
        Value::from_debug(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults() {
        let args = CliArgs::parse_from(["self"]);
        assert_eq!(
            args,
            CliArgs {
                operation: "select-one".to_string(),
                config: None,
                backends: vec![],
                seed: None,
                list: false,
            }
        );
    }

    #[test]
    fn test_args_parsing() {
        let args = CliArgs::parse_from([
            "self",
            "--operation",
            "all",
            "--config",
            "foo.toml",
            "-b",
            "rusqlite",
            "-b",
            "rusqlite-tx",
            "--seed",
            "7",
        ]);
        assert_eq!(args.operation, "all");
        assert_eq!(args.config, Some("foo.toml".to_string()));
        assert_eq!(args.backends, vec!["rusqlite", "rusqlite-tx"]);
        assert_eq!(args.seed, Some(7));
        assert!(!args.list);
    }
}
