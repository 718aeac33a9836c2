//! Command-line options.

use std::path::{Path, PathBuf};

use crate::CompileError;

pub const USAGE: &str = "\
Usage: ariac <input.aria> [options]

Options:
  --asm-only              Stop after writing the .asm file
  -o <path>               Output executable (default: input without extension,
                          or <input>.out when the input has none)
  --runtime-path=<dir>    Directory containing libaria_rt.a";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Options {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub asm_only: bool,
    pub runtime_path: Option<PathBuf>,
}

impl Options {
    /// Parse arguments, not including the program name.
    pub fn parse<I>(args: I) -> Result<Self, CompileError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut options = Options::default();
        let mut input = None;
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            if arg == "--asm-only" {
                options.asm_only = true;
            } else if arg == "-o" {
                let Some(path) = args.next() else {
                    return Err(CompileError::Usage("-o requires a path".to_owned()));
                };
                options.output = Some(PathBuf::from(path));
            } else if let Some(dir) = arg.strip_prefix("--runtime-path=") {
                options.runtime_path = Some(PathBuf::from(dir));
            } else if arg.starts_with('-') {
                return Err(CompileError::Usage(format!("unknown option: {arg}")));
            } else if input.is_none() {
                input = Some(PathBuf::from(arg));
            } else {
                return Err(CompileError::Usage(format!("unexpected argument: {arg}")));
            }
        }
        options.input = input.ok_or_else(|| CompileError::Usage("missing input file".to_owned()))?;
        if options.output.as_ref() == Some(&options.input) {
            return Err(CompileError::Usage(
                "output path would overwrite the input file".to_owned(),
            ));
        }
        Ok(options)
    }

    pub fn asm_path(&self) -> PathBuf {
        self.derived("asm")
    }

    pub fn object_path(&self) -> PathBuf {
        self.derived("o")
    }

    pub fn executable_path(&self) -> PathBuf {
        match &self.output {
            Some(path) => path.clone(),
            None if self.input.extension().is_some() => self.input.with_extension(""),
            None => self.appended("out"),
        }
    }

    /// The input with its extension replaced by `ext`, never the input
    /// path itself.
    fn derived(&self, ext: &str) -> PathBuf {
        match self.input.extension() {
            Some(current) if current != ext => self.input.with_extension(ext),
            _ => self.appended(ext),
        }
    }

    /// `<input>.<ext>`, keeping any extension the input already has.
    fn appended(&self, ext: &str) -> PathBuf {
        let mut path = self.input.clone().into_os_string();
        path.push(".");
        path.push(ext);
        PathBuf::from(path)
    }

    pub fn runtime_path(&self) -> Option<&Path> {
        self.runtime_path.as_deref()
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests panic on unexpected state"
)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(args: &[&str]) -> Result<Options, CompileError> {
        Options::parse(args.iter().map(|s| (*s).to_owned()))
    }

    #[test]
    fn test_defaults() {
        let options = parse(&["demo/hello.aria"]).unwrap();
        assert_eq!(options.input, PathBuf::from("demo/hello.aria"));
        assert!(!options.asm_only);
        assert_eq!(options.asm_path(), PathBuf::from("demo/hello.asm"));
        assert_eq!(options.object_path(), PathBuf::from("demo/hello.o"));
        assert_eq!(options.executable_path(), PathBuf::from("demo/hello"));
    }

    #[test]
    fn test_all_flags() {
        let options = parse(&["-o", "out/bin", "x.aria", "--asm-only", "--runtime-path=/opt/aria/lib"]).unwrap();
        assert_eq!(
            options,
            Options {
                input: PathBuf::from("x.aria"),
                output: Some(PathBuf::from("out/bin")),
                asm_only: true,
                runtime_path: Some(PathBuf::from("/opt/aria/lib")),
            }
        );
        assert_eq!(options.executable_path(), PathBuf::from("out/bin"));
        assert_eq!(options.runtime_path(), Some(Path::new("/opt/aria/lib")));
    }

    #[test]
    fn test_outputs_never_replace_an_extensionless_input() {
        let options = parse(&["prog"]).unwrap();
        assert_eq!(options.executable_path(), PathBuf::from("prog.out"));
        assert_eq!(options.asm_path(), PathBuf::from("prog.asm"));
        assert_eq!(options.object_path(), PathBuf::from("prog.o"));
        assert_ne!(options.executable_path(), options.input);
    }

    #[test]
    fn test_outputs_never_replace_an_input_with_their_extension() {
        let options = parse(&["build/prog.asm"]).unwrap();
        assert_eq!(options.asm_path(), PathBuf::from("build/prog.asm.asm"));
        assert_eq!(options.object_path(), PathBuf::from("build/prog.o"));
        assert_eq!(options.executable_path(), PathBuf::from("build/prog"));

        let object = parse(&["prog.o"]).unwrap();
        assert_eq!(object.object_path(), PathBuf::from("prog.o.o"));
    }

    #[test]
    fn test_output_equal_to_input_is_refused() {
        assert!(matches!(
            parse(&["prog", "-o", "prog"]),
            Err(CompileError::Usage(m)) if m.contains("overwrite")
        ));
    }

    #[test]
    fn test_usage_errors() {
        assert!(matches!(parse(&[]), Err(CompileError::Usage(m)) if m == "missing input file"));
        assert!(matches!(parse(&["a.aria", "-o"]), Err(CompileError::Usage(_))));
        assert!(matches!(parse(&["a.aria", "--fast"]), Err(CompileError::Usage(m)) if m.contains("--fast")));
        assert!(matches!(parse(&["a.aria", "b.aria"]), Err(CompileError::Usage(_))));
    }
}
