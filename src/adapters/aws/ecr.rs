use crate::adapters::aws::sdk_config::to_chrono;
use crate::core::error::AwsApiError;
use crate::core::types::{ContainerImage, Repository};
use crate::ports::RegistryDataSource;
use async_trait::async_trait;
use aws_sdk_ecr::types::{ImageDetail, Repository as SdkRepository};
use tracing::{debug, warn};

const SERVICE: &str = "ECR";

pub(crate) struct AwsEcrDataSource {
    client: aws_sdk_ecr::Client,
}

impl AwsEcrDataSource {
    pub(crate) fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        Self {
            client: aws_sdk_ecr::Client::new(sdk_config),
        }
    }
}

#[async_trait]
impl RegistryDataSource for AwsEcrDataSource {
    async fn list_repositories(&self) -> Result<Vec<Repository>, AwsApiError> {
        let mut repositories = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let output = self
                .client
                .describe_repositories()
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(|e| {
                    AwsApiError::api_call(SERVICE, "DescribeRepositories", e.into_service_error())
                })?;

            for repo in output.repositories() {
                match repository_from_sdk(repo) {
                    Some(converted) => repositories.push(converted),
                    None => warn!("Skipping ECR repository without a name: {:?}", repo),
                }
            }

            match output.next_token() {
                Some(token) => next_token = Some(token.to_string()),
                None => break,
            }
        }

        debug!("Listed {} ECR repositories", repositories.len());
        Ok(repositories)
    }

    async fn list_images(
        &self,
        repository_name: &str,
    ) -> Result<Vec<ContainerImage>, AwsApiError> {
        let mut images = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let output = self
                .client
                .describe_images()
                .repository_name(repository_name)
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(|e| {
                    AwsApiError::api_call(SERVICE, "DescribeImages", e.into_service_error())
                })?;

            images.extend(output.image_details().iter().map(image_from_sdk));

            match output.next_token() {
                Some(token) => next_token = Some(token.to_string()),
                None => break,
            }
        }

        debug!(
            "Listed {} images for ECR repository {}",
            images.len(),
            repository_name
        );
        Ok(images)
    }
}

fn repository_from_sdk(repo: &SdkRepository) -> Option<Repository> {
    Some(Repository {
        name: repo.repository_name()?.to_string(),
        uri: repo.repository_uri().unwrap_or_default().to_string(),
        created_at: repo.created_at().and_then(to_chrono),
    })
}

fn image_from_sdk(detail: &ImageDetail) -> ContainerImage {
    ContainerImage {
        tags: detail.image_tags().to_vec(),
        digest: detail.image_digest().unwrap_or_default().to_string(),
        pushed_at: detail.image_pushed_at().and_then(to_chrono),
        size_bytes: detail.image_size_in_bytes(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_ecr::primitives::DateTime;

    #[test]
    fn test_repository_conversion() {
        let sdk = SdkRepository::builder()
            .repository_name("svc-api")
            .repository_uri("123.dkr.ecr.eu-central-1.amazonaws.com/svc-api")
            .created_at(DateTime::from_secs(1_700_000_000))
            .build();

        let repo = repository_from_sdk(&sdk).unwrap();
        assert_eq!(repo.name, "svc-api");
        assert_eq!(repo.created_at.map(|t| t.timestamp()), Some(1_700_000_000));
        assert!(repository_from_sdk(&SdkRepository::builder().build()).is_none());
    }

    #[test]
    fn test_untagged_image_conversion() {
        let sdk = ImageDetail::builder()
            .image_digest("sha256:abc")
            .image_size_in_bytes(1024)
            .build();

        let image = image_from_sdk(&sdk);
        assert!(image.tags.is_empty());
        assert_eq!(image.digest, "sha256:abc");
        assert_eq!(image.size_bytes, Some(1024));
    }
}
