use super::Spreadsheet;
use crate::error::{Result, SpreadsheetError};
use crate::storage::{Entry, SheetFile, parse_cgs, write_cgs};
use log::debug;
use std::path::{Path, PathBuf};

impl Spreadsheet {
    /// Open a `.cgs` file with the given name rules and expected version tag.
    pub fn open<N, V>(path: &Path, normalize: N, is_valid: V, version: impl Into<String>) -> Result<Self>
    where
        N: Fn(&str) -> String + 'static,
        V: Fn(&str) -> bool + 'static,
    {
        let mut sheet = Self::with_rules(normalize, is_valid, version);
        sheet.load_file(path)?;
        Ok(sheet)
    }

    /// Save to current file path.
    /// Returns the path saved to.
    pub fn save_file(&mut self) -> Result<PathBuf> {
        let Some(path) = self.file_path.clone() else {
            return Err(SpreadsheetError::NoFilePath);
        };

        write_cgs(&path, self)?;
        self.modified = false;
        Ok(path)
    }

    /// Save to `path` and remember it as the current file path.
    pub fn save_as(&mut self, path: &Path) -> Result<()> {
        self.file_path = Some(path.to_path_buf());
        self.save_file()?;
        Ok(())
    }

    /// Load from file, replacing every cell.
    ///
    /// The file is replayed into a scratch sheet first, so a bad file leaves
    /// this sheet unchanged.
    pub fn load_file(&mut self, path: &Path) -> Result<()> {
        let file = parse_cgs(path)?;
        let loaded = self.replay(file)?;

        self.cells = loaded.cells;
        self.graph = loaded.graph;
        self.file_path = Some(path.to_path_buf());
        self.modified = false;
        debug!("loaded {} cell(s) from {}", self.cells.len(), path.display());
        Ok(())
    }

    /// Rebuild a sheet by setting each entry in file order.
    pub(crate) fn replay(&self, file: SheetFile) -> Result<Spreadsheet> {
        let found = file.version.unwrap_or_default();
        if found != self.version {
            return Err(SpreadsheetError::VersionMismatch {
                expected: self.version.clone(),
                found,
            });
        }

        let mut sheet = self.empty_like();
        for Entry { line, name, contents } in file.entries {
            sheet
                .set_cell_contents(&name, contents)
                .map_err(|e| SpreadsheetError::Parse {
                    line,
                    message: e.to_string(),
                })?;
        }
        Ok(sheet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DEFAULT_VERSION;
    use cellgraph_engine::engine::{CellContents, CellValue, accept_all, identity, uppercase};

    fn temp_path(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "cellgraph_{}_{}_{}_{:?}.cgs",
            tag,
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos(),
            std::thread::current().id(),
        ))
    }

    struct Cleanup(PathBuf);
    impl Drop for Cleanup {
        fn drop(&mut self) {
            let _ = std::fs::remove_file(&self.0);
        }
    }

    #[test]
    fn test_save_and_load() {
        let path = temp_path("save_load");
        let _cleanup = Cleanup(path.clone());

        let mut s1 = Spreadsheet::with_rules(uppercase, accept_all, "v2");
        s1.set_contents("a1", "hi").unwrap();
        s1.set_contents("b1", "2").unwrap();
        s1.set_contents("c1", "=B1 + 2").unwrap();
        s1.set_contents("d1", "=1/0").unwrap();
        s1.save_as(&path).unwrap();
        assert!(!s1.modified);

        let s2 = Spreadsheet::open(&path, uppercase, accept_all, "v2").unwrap();
        for name in ["A1", "B1", "C1", "D1"] {
            assert_eq!(s1.get_value(name).unwrap(), s2.get_value(name).unwrap());
            assert_eq!(s1.get_contents(name).unwrap(), s2.get_contents(name).unwrap());
        }
        assert_eq!(s2.get_value("C1").unwrap(), CellValue::Number(4.0));
        assert_eq!(s2.nonempty_cell_names(), s1.nonempty_cell_names());
        assert_eq!(s2.file_path.as_deref(), Some(path.as_path()));
        assert!(!s2.modified);
    }

    #[test]
    fn test_non_finite_number_never_reaches_a_file() {
        let path = temp_path("non_finite");
        let _cleanup = Cleanup(path.clone());

        let mut sheet = Spreadsheet::new();
        sheet.set_contents("A1", "1").unwrap();
        for n in [f64::INFINITY, f64::NEG_INFINITY, f64::NAN] {
            let err = sheet.set_cell_contents("B1", CellContents::Number(n));
            assert!(matches!(err, Err(SpreadsheetError::NonFiniteNumber(_))));
        }
        assert_eq!(sheet.get_contents("B1").unwrap(), CellContents::Text(String::new()));

        sheet.save_as(&path).unwrap();
        let loaded = Spreadsheet::open(&path, identity, accept_all, DEFAULT_VERSION).unwrap();
        assert_eq!(loaded.nonempty_cell_names(), sheet.nonempty_cell_names());
    }

    #[test]
    fn test_load_forward_references() {
        let path = temp_path("forward");
        let _cleanup = Cleanup(path.clone());
        std::fs::write(&path, "@version: default\nA1: =B1*2\nB1: 21\n").unwrap();

        let mut sheet = Spreadsheet::new();
        sheet.load_file(&path).unwrap();
        assert_eq!(sheet.get_value("A1").unwrap(), CellValue::Number(42.0));
    }

    #[test]
    fn test_load_missing_file() {
        let mut sheet = Spreadsheet::new();
        let err = sheet.load_file(Path::new("/nonexistent/missing.cgs"));
        assert!(matches!(err, Err(SpreadsheetError::Io(_))));
    }

    #[test]
    fn test_load_wrong_version_is_transactional() {
        let path = temp_path("version");
        let _cleanup = Cleanup(path.clone());
        std::fs::write(&path, "@version: other\nA1: 1\n").unwrap();

        let mut sheet = Spreadsheet::new();
        sheet.set_contents("Z1", "keep").unwrap();
        let err = sheet.load_file(&path);
        assert!(matches!(err, Err(SpreadsheetError::VersionMismatch { .. })));
        assert_eq!(sheet.get_contents("Z1").unwrap(), CellContents::Text("keep".into()));
        assert!(sheet.file_path.is_none());
    }

    #[test]
    fn test_load_missing_version() {
        let path = temp_path("no_version");
        let _cleanup = Cleanup(path.clone());
        std::fs::write(&path, "A1: 1\n").unwrap();

        let mut sheet = Spreadsheet::new();
        assert!(matches!(
            sheet.load_file(&path),
            Err(SpreadsheetError::VersionMismatch { .. })
        ));
    }

    #[test]
    fn test_load_circular_file() {
        let path = temp_path("circular");
        let _cleanup = Cleanup(path.clone());
        std::fs::write(&path, "@version: default\nA1: =B1\nB1: =A1\n").unwrap();

        let mut sheet = Spreadsheet::new();
        match sheet.load_file(&path) {
            Err(SpreadsheetError::Parse { line, message }) => {
                assert_eq!(line, 3);
                assert!(message.contains("Circular"));
            }
            other => panic!("expected parse error, got {:?}", other.map(|_| ())),
        }
        assert!(sheet.nonempty_cell_names().is_empty());
    }

    #[test]
    fn test_load_empty_file() {
        let path = temp_path("empty");
        let _cleanup = Cleanup(path.clone());
        std::fs::write(&path, "").unwrap();

        let mut sheet = Spreadsheet::new();
        assert!(sheet.load_file(&path).is_err());
    }

    #[test]
    fn test_save_without_path() {
        let mut sheet = Spreadsheet::new();
        assert!(matches!(sheet.save_file(), Err(SpreadsheetError::NoFilePath)));
    }

    #[test]
    fn test_save_to_bad_path() {
        let mut sheet = Spreadsheet::new();
        sheet.set_contents("A1", "1").unwrap();
        let err = sheet.save_as(Path::new("/nonexistent/dir/out.cgs"));
        assert!(matches!(err, Err(SpreadsheetError::Io(_))));
        assert!(sheet.modified);
    }
}
