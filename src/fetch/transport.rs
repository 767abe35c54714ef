use crate::core::error::LoadError;

/// Supported resource schemes. Anything else is a configuration error and
/// is rejected before a pipeline run starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UriScheme {
    /// `file://` uris and bare filesystem paths.
    File,
    /// `http://` and `https://` uris.
    Http,
}

impl UriScheme {
    pub fn parse(uri: &str) -> Result<Self, LoadError> {
        match uri.split_once("://") {
            // Bare paths are treated as local files.
            None => Ok(UriScheme::File),
            Some(("file", _)) => Ok(UriScheme::File),
            Some(("http", _)) | Some(("https", _)) => Ok(UriScheme::Http),
            Some((scheme, _)) => Err(LoadError::UnsupportedScheme(scheme.to_string())),
        }
    }
}

fn file_path(uri: &str) -> &str {
    uri.strip_prefix("file://").unwrap_or(uri)
}

/// Reads a local file into memory.
pub async fn fetch_file(uri: &str) -> Result<Vec<u8>, LoadError> {
    let path = file_path(uri);
    tokio::fs::read(path)
        .await
        .map_err(|e| LoadError::Fetch(format!("{}: {}", path, e)))
}

/// Downloads a remote resource, reporting `(bytes_received, total_bytes)`
/// after each chunk when the server announced a content length.
pub async fn fetch_http(
    uri: &str,
    mut on_progress: impl FnMut(u64, u64),
) -> Result<Vec<u8>, LoadError> {
    let response = reqwest::get(uri)
        .await
        .map_err(|e| LoadError::Fetch(e.to_string()))?
        .error_for_status()
        .map_err(|e| LoadError::Fetch(e.to_string()))?;

    let total_bytes = response.content_length();
    let mut buffer = match total_bytes {
        Some(len) => Vec::with_capacity(len as usize),
        None => Vec::new(),
    };
    let mut received: u64 = 0;

    let mut response = response;
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| LoadError::Fetch(e.to_string()))?
    {
        received += chunk.len() as u64;
        buffer.extend_from_slice(&chunk);

        if let Some(total) = total_bytes {
            if total > 0 {
                on_progress(received, total);
            }
        }
    }

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_schemes() {
        assert_eq!(UriScheme::parse("file:///tmp/a.gif"), Ok(UriScheme::File));
        assert_eq!(UriScheme::parse("/tmp/a.gif"), Ok(UriScheme::File));
        assert_eq!(UriScheme::parse("C:\\images\\a.gif"), Ok(UriScheme::File));
        assert_eq!(
            UriScheme::parse("http://example.com/a.gif"),
            Ok(UriScheme::Http)
        );
        assert_eq!(
            UriScheme::parse("https://example.com/a.gif"),
            Ok(UriScheme::Http)
        );
    }

    #[test]
    fn rejects_unknown_schemes() {
        let err = UriScheme::parse("ftp://x").unwrap_err();
        assert_eq!(err, LoadError::UnsupportedScheme("ftp".to_string()));
        assert!(err.is_configuration());
    }

    #[test]
    fn strips_file_prefix() {
        assert_eq!(file_path("file:///tmp/a.gif"), "/tmp/a.gif");
        assert_eq!(file_path("/tmp/a.gif"), "/tmp/a.gif");
    }

    #[test]
    fn reads_local_files() {
        let path = std::env::temp_dir().join("gif-view-transport-test.bin");
        std::fs::write(&path, b"hello").unwrap();

        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let bytes = rt
            .block_on(fetch_file(&path.to_string_lossy()))
            .unwrap();
        assert_eq!(bytes, b"hello");

        let missing = rt.block_on(fetch_file("/definitely/not/here.gif"));
        assert!(matches!(missing, Err(LoadError::Fetch(_))));

        let _ = std::fs::remove_file(&path);
    }
}
