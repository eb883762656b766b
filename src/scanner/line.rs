use super::{CodeScanner, Permission, ScanEvent, SymbolType};
use crate::error::ScanError;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

type Reader = Box<dyn AsyncBufRead + Unpin + Send>;

/// Scanner fed by already-decoded codes, one per line.
///
/// Lines are either `<symbol>:<value>` (e.g. `ean-13:0041331023061`) or a
/// bare value whose symbology is inferred. While inactive, incoming lines are
/// read and discarded. Lines that are not UTF-8 are skipped.
pub struct LineScanner {
    pending_file: Option<PathBuf>,
    reader: Option<Reader>,
    active: bool,
}

impl LineScanner {
    pub fn stdin() -> Self {
        Self::from_reader(BufReader::new(tokio::io::stdin()))
    }

    /// The file is opened when permission is requested.
    pub fn file(path: PathBuf) -> Self {
        Self {
            pending_file: Some(path),
            reader: None,
            active: true,
        }
    }

    pub fn from_reader<R>(reader: R) -> Self
    where
        R: AsyncBufRead + Unpin + Send + 'static,
    {
        Self {
            pending_file: None,
            reader: Some(Box::new(reader)),
            active: true,
        }
    }
}

impl CodeScanner for LineScanner {
    async fn request_permission(&mut self) -> Result<Permission, ScanError> {
        let Some(path) = self.pending_file.take() else {
            return Ok(Permission::Granted);
        };

        match tokio::fs::File::open(&path).await {
            Ok(file) => {
                tracing::debug!("Reading codes from {}", path.display());
                self.reader = Some(Box::new(BufReader::new(file)));
                Ok(Permission::Granted)
            }
            Err(e) if e.kind() == ErrorKind::PermissionDenied => Ok(Permission::Denied),
            Err(e) => Err(ScanError::DeviceUnavailable(format!(
                "{}: {}",
                path.display(),
                e
            ))),
        }
    }

    fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    #[cfg(test)]
    fn is_active(&self) -> bool {
        self.active
    }

    async fn next_event(&mut self) -> Result<Option<ScanEvent>, ScanError> {
        let reader = self.reader.as_mut().ok_or_else(|| {
            ScanError::DeviceUnavailable("scanner has not been started".to_string())
        })?;

        let mut buf = Vec::new();
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf).await? == 0 {
                return Ok(None);
            }
            let Ok(line) = std::str::from_utf8(&buf) else {
                tracing::warn!("Skipping scanner line that is not valid UTF-8");
                continue;
            };
            let Some(event) = parse_line(line) else {
                continue;
            };
            if !self.active {
                tracing::debug!("Scanner inactive, dropping {}", event.value);
                continue;
            }
            return Ok(Some(event));
        }
    }
}

fn parse_line(line: &str) -> Option<ScanEvent> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    if let Some((prefix, rest)) = line.split_once(':') {
        if let Some(symbol) = SymbolType::parse(prefix) {
            let value = rest.trim();
            if value.is_empty() {
                return None;
            }
            return Some(ScanEvent {
                symbol,
                value: value.to_string(),
            });
        }
    }

    Some(ScanEvent {
        symbol: SymbolType::infer(line),
        value: line.to_string(),
    })
}
