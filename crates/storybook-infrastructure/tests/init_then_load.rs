use storybook_core::secret::SecretService;
use storybook_infrastructure::{SecretServiceImpl, StorybookPaths};

#[tokio::test]
async fn test_fresh_template_means_offline() {
    let dir = tempfile::tempdir().unwrap();
    let paths = StorybookPaths::new(Some(dir.path()));
    let (path, created) = paths.ensure_secret_file().unwrap();
    assert!(created);

    let service = SecretServiceImpl::with_file(path);
    assert!(service.secret_file_exists().await);

    let secrets = service.load_secrets().await.unwrap();
    assert!(secrets.gemini.is_some());
    assert!(secrets.usable_gemini().is_none());
}

#[tokio::test]
async fn test_env_key_makes_template_usable() {
    let dir = tempfile::tempdir().unwrap();
    let (path, _) = StorybookPaths::new(Some(dir.path())).ensure_secret_file().unwrap();

    let secrets = SecretServiceImpl::with_file(path)
        .with_env_api_key(Some("from-env".into()))
        .load_secrets()
        .await
        .unwrap();

    let gemini = secrets.usable_gemini().unwrap();
    assert_eq!(gemini.api_key, "from-env");
    assert_eq!(gemini.text_model(), "gemini-2.5-flash");
}
