use rds_query_core::contract::QuerySource;
use rds_query_core::error::PipelineError;

pub trait QueryObjectStore {
    fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, String>;
}

/// Reads the statement text fresh from the bucket on every call.
pub fn load_query_source(
    store: &dyn QueryObjectStore,
    bucket: &str,
    key: &str,
) -> Result<QuerySource, PipelineError> {
    let bytes = store
        .get_object(bucket, key)
        .map_err(PipelineError::QuerySource)?;
    let text = String::from_utf8(bytes).map_err(|error| {
        PipelineError::QuerySource(format!("object s3://{bucket}/{key} is not UTF-8: {error}"))
    })?;

    QuerySource::new(text)
        .ok_or_else(|| PipelineError::QuerySource(format!("object s3://{bucket}/{key} is empty")))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedStore(Result<Vec<u8>, String>);

    impl QueryObjectStore for FixedStore {
        fn get_object(&self, _bucket: &str, _key: &str) -> Result<Vec<u8>, String> {
            self.0.clone()
        }
    }

    #[test]
    fn loads_statement_text() {
        let store = FixedStore(Ok(b"SELECT id, name, price FROM books\n".to_vec()));

        let source = load_query_source(&store, "bucket", "test.sql").expect("should load");

        assert_eq!(source.as_str(), "SELECT id, name, price FROM books\n");
    }

    #[test]
    fn missing_object_is_a_query_source_error() {
        let store = FixedStore(Err("NoSuchKey".to_string()));

        let error = load_query_source(&store, "bucket", "test.sql").expect_err("should fail");

        assert_eq!(error, PipelineError::QuerySource("NoSuchKey".to_string()));
    }

    #[test]
    fn empty_and_non_utf8_objects_are_rejected() {
        let error = load_query_source(&FixedStore(Ok(Vec::new())), "bucket", "test.sql")
            .expect_err("empty should fail");
        assert_eq!(
            error,
            PipelineError::QuerySource("object s3://bucket/test.sql is empty".to_string())
        );

        let error = load_query_source(&FixedStore(Ok(vec![0xff, 0xfe])), "bucket", "test.sql")
            .expect_err("invalid UTF-8 should fail");
        assert!(error.to_string().contains("is not UTF-8"));
    }
}
