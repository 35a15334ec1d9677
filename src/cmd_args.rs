use std::ffi::OsString;
use std::path::{Path, PathBuf};

pub use clap::Parser;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct ClapArgs {
    /// Profile name
    /// Profile holding the storefront server and session. Default is 'default'.
    /// If the profile is not configured, network actions will fail.
    #[clap(short = 'p', long, default_value = "default", help = "profile name")]
    profile: String,

    #[clap(short = 'v', long, help = "log routing and requests to stderr")]
    verbose: bool,

    /// Rendered storefront page the session operates on
    #[clap(long, value_name = "FILE", help = "page markup to load")]
    page: PathBuf,

    /// Command script; commands are read from stdin when omitted
    #[clap(long, value_name = "FILE", help = "run commands from a file")]
    script: Option<PathBuf>,

    #[clap(short = 'y', long, help = "answer yes to confirmations")]
    assume_yes: bool,
}

#[derive(Debug, Clone)]
pub struct CommandLineArgs {
    profile: String,
    verbose: bool,
    page: PathBuf,
    script: Option<PathBuf>,
    assume_yes: bool,
}

impl From<ClapArgs> for CommandLineArgs {
    fn from(args: ClapArgs) -> Self {
        Self {
            profile: args.profile,
            verbose: args.verbose,
            page: args.page,
            script: args.script,
            assume_yes: args.assume_yes,
        }
    }
}

impl CommandLineArgs {
    pub fn parse() -> Self {
        ClapArgs::parse().into()
    }

    pub fn parse_from<I, T>(itr: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        ClapArgs::parse_from(itr).into()
    }

    pub fn try_parse_from<I, T>(itr: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        ClapArgs::try_parse_from(itr).map(Into::into)
    }

    pub fn profile(&self) -> &String {
        &self.profile
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }

    pub fn page(&self) -> &Path {
        &self.page
    }

    pub fn script(&self) -> Option<&Path> {
        self.script.as_deref()
    }

    pub fn assume_yes(&self) -> bool {
        self.assume_yes
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_args_profile_only() {
        let args = CommandLineArgs::parse_from(["program", "--profile", "test", "--page", "p.html"]);
        assert_eq!(args.profile(), "test");
        assert_eq!(args.page(), Path::new("p.html"));
    }

    #[test]
    fn test_parse_args_short_flags() {
        let args = CommandLineArgs::parse_from(["program", "-p", "dev", "-v", "-y", "--page", "p.html"]);
        assert_eq!(args.profile(), "dev");
        assert!(args.verbose());
        assert!(args.assume_yes());
    }

    #[test]
    fn test_default_values() {
        let args = CommandLineArgs::parse_from(["program", "--page", "p.html"]);
        assert_eq!(args.profile(), "default");
        assert!(!args.verbose());
        assert!(!args.assume_yes());
        assert_eq!(args.script(), None);
    }

    #[test]
    fn test_script_path() {
        let args = CommandLineArgs::parse_from(["program", "--page", "p.html", "--script", "run.txt"]);
        assert_eq!(args.script(), Some(Path::new("run.txt")));
    }

    #[test]
    fn test_page_is_required() {
        assert!(CommandLineArgs::try_parse_from(["program"]).is_err());
    }
}
