use std::path::PathBuf;

/// Command line of the runner
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunnerArgs {
    /// Book config file; the embedded default when absent
    pub config: Option<PathBuf>,
    /// Newline-delimited feed payloads to replay instead of connecting
    pub replay: Option<PathBuf>,
}

impl RunnerArgs {
    /// Parse arguments (without the program name)
    pub fn parse<I, S>(args: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut parsed = RunnerArgs::default();
        let mut args = args.into_iter().map(Into::into);

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--replay" => {
                    let path = args.next().ok_or("--replay needs a file")?;
                    parsed.replay = Some(PathBuf::from(path));
                }
                flag if flag.starts_with("--") => return Err(format!("Unknown option {}", flag)),
                _ if parsed.config.is_none() => parsed.config = Some(PathBuf::from(&arg)),
                _ => return Err(format!("Unexpected argument {}", arg)),
            }
        }

        Ok(parsed)
    }
}
