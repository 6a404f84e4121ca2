use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::counter::HuggingFaceCounter;
use super::traits::{TokenCounter, TokenizerError, TokenizerLoader};

/// Filesystem resolver: an identifier is either a direct path to a
/// `tokenizer.json` file or a model id looked up as
/// `<tokenizer_dir>/<id>/tokenizer.json`.
pub struct FileLoader {
    tokenizer_dir: PathBuf,
}

impl FileLoader {
    pub fn new(tokenizer_dir: impl Into<PathBuf>) -> Self {
        Self {
            tokenizer_dir: tokenizer_dir.into(),
        }
    }

    fn resolve(&self, model: &str) -> Option<PathBuf> {
        let direct = Path::new(model);
        if direct.extension().is_some_and(|ext| ext == "json") && direct.is_file() {
            return Some(direct.to_path_buf());
        }
        let nested = self.tokenizer_dir.join(model).join("tokenizer.json");
        nested.is_file().then_some(nested)
    }
}

impl TokenizerLoader for FileLoader {
    fn load(&self, model: &str) -> Result<Arc<dyn TokenCounter>, TokenizerError> {
        let path = self.resolve(model).ok_or_else(|| TokenizerError::NotFound {
            model: model.to_string(),
            dir: self.tokenizer_dir.clone(),
        })?;
        tracing::debug!(model, path = %path.display(), "loading tokenizer");
        Ok(Arc::new(HuggingFaceCounter::from_file(&path)?))
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn resolves_model_id_under_tokenizer_dir() {
        let dir = tempfile::tempdir().unwrap();
        let model_dir = dir.path().join("acme/base");
        fs::create_dir_all(&model_dir).unwrap();
        fs::write(model_dir.join("tokenizer.json"), "{}").unwrap();

        let loader = FileLoader::new(dir.path());
        let resolved = loader.resolve("acme/base").unwrap();
        assert_eq!(resolved, model_dir.join("tokenizer.json"));
    }

    #[test]
    fn resolves_direct_json_path() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("tokenizer.json");
        fs::write(&file, "{}").unwrap();

        let loader = FileLoader::new("nowhere");
        let resolved = loader.resolve(file.to_str().unwrap()).unwrap();
        assert_eq!(resolved, file);
    }

    #[test]
    fn missing_model_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let loader = FileLoader::new(dir.path());
        assert!(matches!(
            loader.load("ghost/model"),
            Err(TokenizerError::NotFound { .. })
        ));
    }

    #[test]
    fn unparseable_vocabulary_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let model_dir = dir.path().join("broken");
        fs::create_dir_all(&model_dir).unwrap();
        fs::write(model_dir.join("tokenizer.json"), "not a tokenizer").unwrap();

        let loader = FileLoader::new(dir.path());
        assert!(matches!(
            loader.load("broken"),
            Err(TokenizerError::Load { .. })
        ));
    }
}
