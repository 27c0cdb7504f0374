//! Content Source Integration Tests
//!
//! Loading registries from YAML and JSON files on disk.

use rulebook::{ContentSource, RegistryError, SourceError, ValidationPolicy, ValidationWarning};
use tempfile::TempDir;

const OFFICIAL_YAML: &str = r#"
records:
  - slug: shadcn-ui
    title: Shadcn UI
    tags: [UI, Components, Shadcn]
    content: Write the rule
    libs: [shadcn]
    author:
      name: shadcn
      url: https://twitter.com/shadcn
      avatar: https://github.com/shadcn.png
  - slug: nextjs
    title: Next.js
    tags: [Next.js, React, Typescript]
    content: |
      # Next.js

      Prefer server components.
sections:
  - tag: Official
    recordSlugs: [shadcn-ui, nextjs]
"#;

const COMMUNITY_JSON: &str = r#"[
  {
    "tag": "Community",
    "rules": [
      "nextjs",
      {
        "slug": "hono",
        "title": "Hono",
        "tags": ["Typescript", "API"],
        "content": "",
        "author": { "name": "yusuke" }
      }
    ]
  }
]"#;

fn write(dir: &TempDir, name: &str, body: &str) {
    std::fs::write(dir.path().join(name), body).unwrap();
}

#[tokio::test]
async fn test_load_directory_merges_files_in_order() {
    let temp = TempDir::new().unwrap();
    write(&temp, "01-official.yaml", OFFICIAL_YAML);
    write(&temp, "02-community.json", COMMUNITY_JSON);

    let registry = ContentSource::from_path(temp.path())
        .load_registry()
        .await
        .unwrap();

    let slugs: Vec<_> = registry.records().iter().map(|r| r.slug().as_str()).collect();
    assert_eq!(slugs, vec!["shadcn-ui", "nextjs", "hono"]);

    let sections: Vec<_> = registry.list_sections().iter().map(|s| s.tag()).collect();
    assert_eq!(sections, vec!["Official", "Community"]);

    let community = registry.section("Community").unwrap();
    let members: Vec<_> = registry
        .section_records(community)
        .iter()
        .map(|r| r.slug().as_str())
        .collect();
    assert_eq!(members, vec!["nextjs", "hono"]);

    let typescript: Vec<_> = registry
        .list_by_tag("Typescript")
        .iter()
        .map(|r| r.slug().as_str())
        .collect();
    assert_eq!(typescript, vec!["nextjs", "hono"]);
}

#[tokio::test]
async fn test_loaded_content_flags_placeholders() {
    let temp = TempDir::new().unwrap();
    write(&temp, "01-official.yaml", OFFICIAL_YAML);
    write(&temp, "02-community.json", COMMUNITY_JSON);

    let registry = ContentSource::from_path(temp.path())
        .load_registry()
        .await
        .unwrap();
    let report = registry.validate(&ValidationPolicy::default());

    assert_eq!(
        report.warnings(),
        &[
            ValidationWarning::PlaceholderContent {
                slug: "shadcn-ui".to_string(),
                marker: "Write the rule".to_string(),
            },
            ValidationWarning::EmptyContent {
                slug: "hono".to_string()
            },
        ]
    );
}

#[tokio::test]
async fn test_glob_pattern_selects_files() {
    let temp = TempDir::new().unwrap();
    write(&temp, "official.yaml", OFFICIAL_YAML);
    write(&temp, "community.json", COMMUNITY_JSON);

    let pattern = temp.path().join("*.yaml").to_string_lossy().into_owned();
    let registry = ContentSource::new([pattern]).load_registry().await.unwrap();

    assert_eq!(registry.len(), 2);
    assert!(registry.get_by_slug("hono").is_none());
}

#[tokio::test]
async fn test_unknown_section_slug_surfaces_registry_error() {
    let temp = TempDir::new().unwrap();
    // Community references nextjs, which only the YAML file defines
    write(&temp, "community.json", COMMUNITY_JSON);

    let err = ContentSource::from_path(temp.path())
        .load_registry()
        .await
        .unwrap_err();

    match err {
        SourceError::Registry(RegistryError::UnknownSlugInSection { section, slug }) => {
            assert_eq!(section, "Community");
            assert_eq!(slug, "nextjs");
        }
        other => panic!("Expected UnknownSlugInSection, got {:?}", other),
    }
}

#[tokio::test]
async fn test_duplicate_slug_across_files() {
    let temp = TempDir::new().unwrap();
    write(&temp, "a.yaml", OFFICIAL_YAML);
    write(&temp, "b.yaml", "records:\n  - slug: nextjs\n    title: Next.js again\n");

    let err = ContentSource::from_path(temp.path())
        .load_registry()
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        SourceError::Registry(RegistryError::DuplicateSlug(ref slug)) if slug == "nextjs"
    ));
}

#[tokio::test]
async fn test_invalid_author_url_rejected() {
    let temp = TempDir::new().unwrap();
    write(
        &temp,
        "rules.yaml",
        "records:\n  - slug: hono\n    title: Hono\n    author:\n      name: yusuke\n      url: not a uri\n",
    );

    let err = ContentSource::from_path(temp.path().join("rules.yaml"))
        .load_registry()
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        SourceError::Registry(RegistryError::InvalidRecord { .. })
    ));
}

#[tokio::test]
async fn test_missing_source_reports_patterns() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("nope").to_string_lossy().into_owned();

    let err = ContentSource::new([missing.clone()]).load().await.unwrap_err();
    match err {
        SourceError::NoSources(patterns) => assert_eq!(patterns, missing),
        other => panic!("Expected NoSources, got {:?}", other),
    }
}

#[tokio::test]
async fn test_paths_with_glob_characters_load_literally() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("rules[v1]");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join("a.yaml"),
        "records:\n  - slug: hono\n    title: Hono\n    author:\n      name: yusuke\n      url: \"\"\n",
    )
    .unwrap();

    let from_dir = ContentSource::from_path(&dir).load_registry().await.unwrap();
    assert!(from_dir.get_by_slug("hono").is_some());

    let from_file = ContentSource::from_path(dir.join("a.yaml"))
        .load_registry()
        .await
        .unwrap();
    let author = from_file.get_by_slug("hono").unwrap().author().unwrap();
    assert_eq!(author.url(), None);
}
