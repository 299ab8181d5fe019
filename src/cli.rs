// cli.rs - Command-line interface configuration
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "scene-primer")]
#[command(about = "Textured, Phong-lit mesh, sphere and box rendered with wgpu", long_about = None)]
pub struct Cli {
    /// JSON configuration file; missing fields keep their defaults
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory that relative asset and shader paths are resolved against
    #[arg(long)]
    pub assets: Option<PathBuf>,

    /// Wait for the display refresh between frames
    #[arg(long, default_value = "false")]
    pub vsync: bool,

    /// Disable the FPS overlay
    #[arg(long = "no-ui", default_value = "false")]
    pub no_ui: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_arguments() {
        let cli = Cli::try_parse_from(["scene-primer"]).expect("parses");
        assert!(cli.config.is_none());
        assert!(cli.assets.is_none());
        assert!(!cli.vsync);
        assert!(!cli.no_ui);
    }

    #[test]
    fn test_all_arguments() {
        let cli = Cli::try_parse_from([
            "scene-primer",
            "--config",
            "demo.json",
            "--assets",
            "data",
            "--vsync",
            "--no-ui",
        ])
        .expect("parses");
        assert_eq!(cli.config, Some(PathBuf::from("demo.json")));
        assert_eq!(cli.assets, Some(PathBuf::from("data")));
        assert!(cli.vsync);
        assert!(cli.no_ui);
    }

    #[test]
    fn test_unknown_argument_rejected() {
        assert!(Cli::try_parse_from(["scene-primer", "--bogus"]).is_err());
    }
}
