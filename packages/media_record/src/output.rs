use meet_protocol::egress::{EncodedFileOutput, S3Upload};

/// Where the platform writes composite recordings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutput {
    /// Upload to an S3 compatible bucket (MinIO in local setups).
    S3(S3Upload),
    /// Keep the file on the egress host, under `dir`.
    File { dir: String },
}

impl RecordOutput {
    pub fn file_output(&self, filename: &str) -> EncodedFileOutput {
        match self {
            RecordOutput::S3(upload) => EncodedFileOutput {
                filepath: filename.to_owned(),
                s3: Some(upload.clone()),
            },
            RecordOutput::File { dir } => EncodedFileOutput {
                filepath: format!("{}/{}", dir.trim_end_matches('/'), filename),
                s3: None,
            },
        }
    }

    /// Path on the egress host, only known for file outputs.
    pub fn local_path(&self, filename: &str) -> Option<String> {
        match self {
            RecordOutput::S3(_) => None,
            RecordOutput::File { .. } => Some(self.file_output(filename).filepath),
        }
    }
}
