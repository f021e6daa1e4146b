use crate::config::types::{BenchError, Result};
use crate::judge::adapter::JudgeAdapter;
use crate::judge::languages::cpp::CppAdapter;

pub fn adapter_for(language: &str) -> Result<Box<dyn JudgeAdapter>> {
    match language {
        "cpp" | "c++" | "cxx" | "cc" => Ok(Box::new(CppAdapter)),
        _ => Err(BenchError::Config(format!(
            "unsupported language adapter: {language}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cpp_aliases() {
        for name in ["cpp", "c++", "cxx", "cc"] {
            assert_eq!(adapter_for(name).unwrap().language(), "cpp");
        }
    }

    #[test]
    fn test_unknown_language_is_config_error() {
        assert!(matches!(adapter_for("cobol"), Err(BenchError::Config(_))));
    }
}
