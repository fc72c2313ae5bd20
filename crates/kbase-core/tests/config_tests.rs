use std::fs;
use std::path::Path;

use kbase_core::config::{expand_path, resolve_with_base, Config};
use kbase_core::settings::{Settings, StoreBackend, TokenizerKind};
use kbase_core::Error;
use tempfile::TempDir;

#[test]
fn empty_directory_yields_defaults() {
    let tmp = TempDir::new().unwrap();
    let settings = Config::load_from(tmp.path(), "dev").unwrap().settings().expect("defaults are valid");
    assert_eq!(settings.chunking.chunk_size, 500);
    assert_eq!(settings.chunking.chunk_overlap, 50);
    assert_eq!(settings.retrieval.top_k, 5);
    assert!((settings.retrieval.vector_weight - 0.7).abs() < 1e-6);
    assert!((settings.retrieval.lexical_weight - 0.3).abs() < 1e-6);
    assert_eq!(settings.retrieval.final_count, 3);
    assert_eq!(settings.lexical.tokenizer, TokenizerKind::Jieba);
    assert_eq!(settings.vector_store.backend, StoreBackend::Lance);
    assert!(Path::new(&settings.vector_store.uri).starts_with(tmp.path()), "relative store uri resolves against the config dir");
}

#[test]
fn env_overlay_overrides_base_file() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("config.toml"),
        "[retrieval]\ntop_k = 8\nfinal_count = 4\n\n[lexical]\ntokenizer = \"analyzer\"\n",
    )
    .unwrap();
    fs::write(tmp.path().join("config.test.toml"), "[retrieval]\ntop_k = 12\n\n[vector_store]\nbackend = \"memory\"\n").unwrap();

    let config = Config::load_from(tmp.path(), "test").unwrap();
    let settings = config.settings().unwrap();
    assert_eq!(settings.retrieval.top_k, 12, "config.test.toml wins");
    assert_eq!(settings.retrieval.final_count, 4, "untouched keys keep the base value");
    assert_eq!(settings.lexical.tokenizer, TokenizerKind::Analyzer);
    assert_eq!(settings.vector_store.backend, StoreBackend::Memory);
    let top_k: usize = config.get("retrieval.top_k").unwrap();
    assert_eq!(top_k, 12);
}

#[test]
fn overlap_not_smaller_than_chunk_size_is_rejected() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("config.toml"), "[chunking]\nchunk_size = 100\nchunk_overlap = 100\n").unwrap();
    let err = Config::load_from(tmp.path(), "dev").unwrap().settings().unwrap_err();
    assert!(matches!(err, Error::InvalidConfig(_)), "got {err:?}");
}

#[test]
fn invalid_values_are_rejected() {
    let mut s = Settings::default();
    s.retrieval.final_count = 0;
    assert!(matches!(s.validate(), Err(Error::InvalidConfig(_))));

    let mut s = Settings::default();
    s.retrieval.vector_weight = -0.1;
    assert!(matches!(s.validate(), Err(Error::InvalidConfig(_))));

    let mut s = Settings::default();
    s.rerank.concurrency = 0;
    assert!(matches!(s.validate(), Err(Error::InvalidConfig(_))));

    assert!(Settings::default().validate().is_ok());
}

#[test]
fn missing_key_is_a_config_error() {
    let tmp = TempDir::new().unwrap();
    let config = Config::load_from(tmp.path(), "dev").unwrap();
    let err = config.get::<String>("no.such.key").unwrap_err();
    assert!(matches!(err, Error::InvalidConfig(_)));
}

#[test]
fn paths_expand_and_resolve() {
    let base = Path::new("/srv/kbase");
    assert_eq!(resolve_with_base(base, "data/lancedb"), base.join("data/lancedb"));
    assert_eq!(resolve_with_base(base, "/var/lib/kbase"), Path::new("/var/lib/kbase"));
    assert_eq!(expand_path("plain/relative"), Path::new("plain/relative"));
}
