use crate::domain::model::{ExtractResult, MappingFormat, TransformResult};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    /// Writes all of `data` or leaves `path` untouched.
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn mapping_path(&self) -> &str;
    fn input_path(&self) -> &str;
    fn output_path(&self) -> &str;
    fn mapping_format(&self) -> MappingFormat;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<ExtractResult>;
    async fn transform(&self, input: ExtractResult) -> Result<TransformResult>;
    async fn load(&self, result: &TransformResult) -> Result<String>;
    /// Where `load` will write.
    fn output_target(&self) -> &str;
}
