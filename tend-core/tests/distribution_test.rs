mod common;

use std::collections::BTreeMap;

use common::Fixture;
use tend_core::distribution::{self, DECOY_FILE, NAME_DEFINITION, ROOT_DEFINITION};
use tend_core::{
    BrowserOptions, BrowserType, DistributionOptions, DistributionUnit, Entry, Error, NodeOptions,
    NodeType, OrchestrationContext, PresetTargets, RepositoryType, SyntaxType, TargetKind,
    TransformStep,
};

fn node_and_module() -> DistributionOptions {
    DistributionOptions {
        node: Some(NodeOptions::default()),
        browser: Some(vec![BrowserOptions::module()]),
        ..Default::default()
    }
}

#[test]
fn test_invalid_script_target_fails_before_touching_disk() {
    let fixture = Fixture::single("kafe", "1.0.0");
    fixture.write("dist/browser/kafe.js", "previous build");

    let dist = DistributionOptions {
        browser: Some(vec![BrowserOptions {
            kind: BrowserType::Script,
            target: None,
            name: None,
            externals: BTreeMap::new(),
        }]),
        ..Default::default()
    };
    let result = OrchestrationContext::builder(RepositoryType::SinglePackage, fixture.root())
        .dist(dist.clone())
        .build();

    assert!(matches!(result, Err(Error::InvalidOptions { .. })));
    assert_eq!(fixture.read("dist/browser/kafe.js"), "previous build");

    let unit = DistributionUnit::for_member(&fixture.root(), "kafe");
    assert!(distribution::derive(&dist, &unit).is_err());
    assert_eq!(fixture.read("dist/browser/kafe.js"), "previous build");
}

#[test]
fn test_node_and_module_targets_share_definitions() {
    let unit = DistributionUnit {
        source: "/repo/src".into(),
        destination: "/repo/dist".into(),
        package_name: "@absolunet/kafe".to_string(),
        engine_range: Some(">= 14.17".to_string()),
    };

    let configs = distribution::derive(&node_and_module(), &unit).unwrap();

    assert_eq!(configs.len(), 2);
    let (node, browser) = (&configs[0], &configs[1]);

    assert_eq!(node.target_kind, TargetKind::ServerRuntime);
    assert_eq!(node.output_path, std::path::PathBuf::from("/repo/dist/node"));
    assert_eq!(
        node.entry,
        Entry::Decoy {
            output: "/repo/dist/node/__decoy__.js".into()
        }
    );
    assert_eq!(
        node.transform_rules[0].steps,
        vec![
            TransformStep::Preset {
                targets: PresetTargets::Node("14.17.0".to_string())
            },
            TransformStep::ModuleInterop,
        ]
    );

    assert_eq!(browser.target_kind, TargetKind::BrowserModule);
    assert_eq!(browser.output_path, std::path::PathBuf::from("/repo/dist/browser"));
    assert_eq!(
        browser.entry,
        Entry::Source {
            path: "/repo/src/index.js".into()
        }
    );

    assert_eq!(node.definitions, browser.definitions);
    assert_eq!(node.definitions[NAME_DEFINITION], "\"@absolunet/kafe\"");
    assert_eq!(node.definitions[ROOT_DEFINITION], "\"/repo/src\"");
}

#[test]
fn test_typescript_module_node_target() {
    let options = DistributionOptions {
        node: Some(NodeOptions {
            kind: NodeType::Module,
            target: Some("^16.0.0 || >= 18".to_string()),
        }),
        syntax: SyntaxType::Typescript,
        include: vec!["**/*.json".to_string(), "/etc/passwd".to_string()],
        ..Default::default()
    };
    let unit = DistributionUnit::for_member(std::path::Path::new("/repo/packages/ui"), "ui");

    let configs = distribution::derive(&options, &unit).unwrap();

    assert_eq!(configs.len(), 1);
    let rules = &configs[0].transform_rules;
    assert_eq!(rules[0].pattern, "**/!(*.d).ts");
    assert_eq!(
        rules[0].steps,
        vec![
            TransformStep::StripTypes,
            TransformStep::Preset {
                targets: PresetTargets::Node("16.0.0".to_string())
            },
        ]
    );
    assert_eq!(rules.len(), 2);
    assert!(rules[1].is_copy());
    assert_eq!(rules[1].pattern, "**/*.json");
}

#[test]
fn test_script_target_produces_single_named_file() {
    let mut script = BrowserOptions::script("Kafe");
    script
        .externals
        .insert("jquery".to_string(), "jQuery".to_string());
    let options = DistributionOptions {
        browser: Some(vec![script]),
        include: vec!["**/*.css".to_string()],
        ..Default::default()
    };
    let unit = DistributionUnit::for_member(std::path::Path::new("/repo"), "kafe");

    let configs = distribution::derive(&options, &unit).unwrap();

    let config = &configs[0];
    assert_eq!(config.target_kind, TargetKind::BrowserScript);
    assert_eq!(config.output_file.as_deref(), Some("Kafe.js"));
    assert_eq!(config.stale_output(), std::path::PathBuf::from("/repo/dist/browser/Kafe.js"));
    assert_eq!(config.externals["jquery"], "jQuery");
    assert!(config.transform_rules.iter().all(|rule| !rule.is_copy()));
    assert_eq!(
        config.transform_rules[0].steps,
        vec![TransformStep::Preset {
            targets: PresetTargets::Browsers("> 0.25%, not dead".to_string())
        }]
    );
}

#[tokio::test]
async fn test_build_cleans_previous_output_and_drops_decoys() {
    let mut fixture = Fixture::single("kafe", "1.0.0");
    fixture.emit_decoys = true;
    fixture.write("dist/node/stale.js", "old");
    fixture.write("dist/browser/stale.js", "old");

    let context = OrchestrationContext::builder(RepositoryType::SinglePackage, fixture.root())
        .dist(node_and_module())
        .build()
        .unwrap();
    let repository = fixture.open(context).await;

    repository.build(false).await.unwrap();

    assert_eq!(fixture.calls.all(), vec!["bundler.run:2"]);
    let dist = fixture.root().join("dist");
    assert!(!dist.join("node/stale.js").exists());
    assert!(!dist.join("browser/stale.js").exists());
    assert!(!dist.join("node").join(DECOY_FILE).exists());
    assert!(!dist.join("browser").join(DECOY_FILE).exists());
}

#[tokio::test]
async fn test_script_build_keeps_sibling_files() {
    let fixture = Fixture::single("kafe", "1.0.0");
    fixture.write("dist/browser/Kafe.js", "old bundle");
    fixture.write("dist/browser/readme.txt", "keep me");

    let context = OrchestrationContext::builder(RepositoryType::SinglePackage, fixture.root())
        .dist(DistributionOptions {
            browser: Some(vec![BrowserOptions::script("Kafe")]),
            ..Default::default()
        })
        .build()
        .unwrap();
    let repository = fixture.open(context).await;

    repository.build(true).await.unwrap();

    assert!(!fixture.root().join("dist/browser/Kafe.js").exists());
    assert_eq!(fixture.read("dist/browser/readme.txt"), "keep me");
}

#[test]
fn test_decoy_replaced_by_real_output_is_kept() {
    let fixture = Fixture::new();
    let unit = DistributionUnit::for_member(&fixture.root(), "kafe");
    let options = DistributionOptions {
        node: Some(NodeOptions::default()),
        ..Default::default()
    };
    let configs = distribution::derive(&options, &unit).unwrap();

    fixture.write("dist/node/__decoy__.js", "module.exports = 42;\n");

    assert_eq!(distribution::remove_decoys(&configs).unwrap(), 0);
    assert!(fixture.root().join("dist/node/__decoy__.js").exists());
}

#[test]
fn test_custom_directories_resolve_against_root() {
    let fixture = Fixture::single("kafe", "1.0.0");
    let context = OrchestrationContext::builder(RepositoryType::SinglePackage, fixture.root())
        .dist(DistributionOptions {
            source: Some("lib".into()),
            destination: Some("./build/out".into()),
            node: Some(NodeOptions::default()),
            ..Default::default()
        })
        .build()
        .unwrap();

    let unit = DistributionUnit::for_root(context.paths(), context.dist().unwrap(), "kafe");

    assert_eq!(unit.source, fixture.root().join("lib"));
    assert_eq!(unit.destination, fixture.root().join("build/out"));
}
