use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "filterchain")]
#[command(version, about = "Run an image through a configured filter pipeline")]
pub struct Args {
    /// Pipeline configuration (JSON)
    #[arg(short, long)]
    pub config: PathBuf,

    /// Image to process
    #[arg(short, long)]
    pub input: PathBuf,

    /// Where to save the result; the format follows the extension
    #[arg(short, long)]
    pub output: PathBuf,

    /// Write every stage as PNG into this directory, overriding the config
    #[arg(long)]
    pub stage_dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_is_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn parses_short_and_long_flags() {
        let args = Args::try_parse_from([
            "filterchain",
            "-c",
            "scan.json",
            "--input",
            "in.jpg",
            "-o",
            "out.png",
            "--stage-dir",
            "stages",
        ])
        .unwrap();
        assert_eq!(args.config, PathBuf::from("scan.json"));
        assert_eq!(args.input, PathBuf::from("in.jpg"));
        assert_eq!(args.output, PathBuf::from("out.png"));
        assert_eq!(args.stage_dir, Some(PathBuf::from("stages")));
    }

    #[test]
    fn output_is_required() {
        assert!(Args::try_parse_from(["filterchain", "-c", "a.json", "-i", "in.png"]).is_err());
    }
}
