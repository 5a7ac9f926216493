use std::fs;
use std::io;
use std::path::Path;

use pretty_assertions::assert_eq;
use sublink_core::prelude::*;
use sublink_core::{relink_workspace, GITMODULES_FILE_NAME};
use sublink_rewrite::SOLUTION_MARKER;
use sublink_test_utils::{same_file, DescriptorBuilder, SolutionBuilder, TempWorkspace};

const MANIFEST: &str = ".sublink";

#[derive(Debug)]
struct CrossVolumeLinker;

impl Linker for CrossVolumeLinker {
    fn link(&self, _original: &Path, _link: &Path) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::Other, "cross-device link"))
    }
}

fn core_descriptor() -> String {
    DescriptorBuilder::new()
        .no_warn(Some("1591"))
        .compile(r"Assets\Core\Runtime.cs")
        .hint_path("Foo", r"libs\Foo.dll")
        .build()
}

/// Workspace with `libs/Core` owning `Core.Runtime` and a root-level `App`
fn game_workspace() -> TempWorkspace {
    let ws = TempWorkspace::new();
    ws.write(
        GITMODULES_FILE_NAME,
        "[submodule \"core\"]\n\tpath = libs/Core\n\turl = ../core.git\n",
    );
    ws.subproject("libs/Core", MANIFEST, &["Core.Runtime"]);
    ws.write(
        "Game.sln",
        &SolutionBuilder::new()
            .project("Core.Runtime", "{C0DE0001-0000-0000-0000-000000000000}")
            .project("App", "{A0000001-0000-0000-0000-000000000000}")
            .build(),
    );
    ws.write("Core.Runtime.csproj", &core_descriptor());
    ws.write("App.csproj", &DescriptorBuilder::new().build());
    ws
}

fn relink(ws: &TempWorkspace) -> RelinkReport {
    let config = SublinkConfig::load(ws.root()).unwrap();
    let mut relinker = Relinker::new(ws.root(), config).unwrap();
    relink_workspace(&mut relinker, None).unwrap()
}

#[test]
fn owned_project_is_relocated_and_linked() {
    let ws = game_workspace();
    let report = relink(&ws);

    assert_eq!(report.linked(), 1);
    assert_eq!(report.skipped(), 0);
    assert!(report.solution_changed);

    let solution = ws.read("Game.sln");
    assert!(solution.contains(r#""Core.Runtime", "libs/Core/Core.Runtime.csproj""#));
    assert!(solution.contains(r#""App", "App.csproj""#));

    assert!(same_file(
        &ws.path("Core.Runtime.csproj"),
        &ws.path("libs/Core/Core.Runtime.csproj")
    ));
    let relocated = ws.read("libs/Core/Core.Runtime.csproj");
    assert!(relocated.contains(r"<HintPath>..\..\libs\Foo.dll</HintPath>"));
    assert!(relocated.contains(r#"<Compile Include="..\..\Assets\Core\Runtime.cs" />"#));
    assert!(relocated.contains(r"<OutputPath>..\..\Temp\bin\Debug\</OutputPath>"));
    assert!(relocated.contains("<NoWarn>1591;1573</NoWarn>"));
}

#[test]
fn unowned_project_keeps_paths() {
    let ws = game_workspace();
    relink(&ws);

    let app = ws.read("App.csproj");
    assert!(app.contains(r"<OutputPath>Temp\bin\Debug\</OutputPath>"));
    assert!(app.contains("<NoWarn>0169;1573;1591</NoWarn>"));
    assert!(!ws.exists("libs/Core/App.csproj"));
}

#[test]
fn duplicate_declarations_collapse_with_single_marker() {
    let ws = TempWorkspace::new();
    ws.write(
        "Game.sln",
        &SolutionBuilder::new()
            .project("Foo", "{ABC}")
            .project("Foo", "{abc}")
            .build(),
    );
    relink(&ws);

    let solution = ws.read("Game.sln");
    assert_eq!(solution.matches(r#"= "Foo""#).count(), 1);
    assert_eq!(solution.matches(SOLUTION_MARKER).count(), 1);

    let lines: Vec<&str> = solution.split("\r\n").collect();
    let marker_line = lines.iter().position(|l| *l == SOLUTION_MARKER).unwrap();
    assert_eq!(marker_line, 2);
}

#[test]
fn second_cycle_changes_nothing() {
    let ws = game_workspace();
    relink(&ws);
    let solution = ws.read("Game.sln");
    let descriptor = ws.read("Core.Runtime.csproj");

    let report = relink(&ws);
    assert!(!report.solution_changed);
    assert!(report.descriptors.iter().all(|(_, changed)| !changed));
    assert_eq!(report.linked(), 1);

    assert_eq!(ws.read("Game.sln"), solution);
    assert_eq!(ws.read("Core.Runtime.csproj"), descriptor);
    assert!(same_file(
        &ws.path("Core.Runtime.csproj"),
        &ws.path("libs/Core/Core.Runtime.csproj")
    ));
}

#[test]
fn first_subproject_in_gitmodules_order_wins() {
    let ws = game_workspace();
    ws.write(
        GITMODULES_FILE_NAME,
        "[submodule \"core\"]\n\tpath = libs/Core\n[submodule \"fork\"]\n\tpath = libs/Fork\n",
    );
    ws.subproject("libs/Fork", MANIFEST, &["core.runtime"]);

    let mut relinker = Relinker::new(ws.root(), SublinkConfig::new()).unwrap();
    let pass = relinker.begin_pass();
    assert_eq!(pass.owners().owner_of("Core.Runtime").unwrap().to_string(), "libs/Core");
    assert_eq!(pass.owners().conflicts().len(), 1);
    assert_eq!(pass.owners().conflicts()[0].ignored.to_string(), "libs/Fork");
}

#[test]
fn link_failure_leaves_root_copy_usable() {
    let ws = game_workspace();
    let mut relinker = Relinker::new(ws.root(), SublinkConfig::new())
        .unwrap()
        .with_linker(Box::new(CrossVolumeLinker));
    let report = relink_workspace(&mut relinker, None).unwrap();

    assert_eq!(report.linked(), 0);
    assert_eq!(report.skipped(), 1);
    assert!(report.generate_text().contains("cross-device link"));

    let root_copy = ws.read("Core.Runtime.csproj");
    assert!(root_copy.contains(r"<HintPath>libs\Foo.dll</HintPath>"));
    assert!(root_copy.contains("<NoWarn>1591;1573</NoWarn>"));
    assert!(!ws.exists("libs/Core/Core.Runtime.csproj"));
}

#[test]
fn missing_root_descriptor_is_materialized() {
    let ws = game_workspace();
    fs::remove_file(ws.path("Core.Runtime.csproj")).unwrap();

    let mut relinker = Relinker::new(ws.root(), SublinkConfig::new()).unwrap();
    let out = relinker.on_generated_project(&ws.path("Core.Runtime.csproj"), &core_descriptor());

    let outcomes = relinker.finish_pass();
    assert!(matches!(
        outcomes.as_slice(),
        [RelocationOutcome::Linked { materialized: true, .. }]
    ));
    assert_eq!(ws.read("Core.Runtime.csproj"), out);
    assert_eq!(ws.read("libs/Core/Core.Runtime.csproj"), out);
}

#[test]
fn ownership_change_retargets_paths() {
    let ws = game_workspace();
    relink(&ws);

    ws.subproject("libs/Core", MANIFEST, &[]);
    ws.subproject("vendor/Deep/Net", MANIFEST, &["Core.Runtime"]);
    ws.write(
        GITMODULES_FILE_NAME,
        "[submodule \"core\"]\n\tpath = libs/Core\n[submodule \"net\"]\n\tpath = vendor/Deep/Net\n",
    );
    relink(&ws);

    let solution = ws.read("Game.sln");
    assert!(solution.contains(r#""Core.Runtime", "vendor/Deep/Net/Core.Runtime.csproj""#));
    let relocated = ws.read("vendor/Deep/Net/Core.Runtime.csproj");
    assert!(relocated.contains(r"<HintPath>..\..\..\libs\Foo.dll</HintPath>"));
    assert!(relocated.contains("<!-- sublink: relocated to vendor/Deep/Net -->"));
    assert!(same_file(
        &ws.path("Core.Runtime.csproj"),
        &ws.path("vendor/Deep/Net/Core.Runtime.csproj")
    ));
    if cfg!(unix) {
        assert!(!ws.exists("libs/Core/Core.Runtime.csproj"));
    }
}

#[test]
fn solution_callback_starts_the_only_pass() {
    let ws = game_workspace();
    let mut relinker = Relinker::new(ws.root(), SublinkConfig::new()).unwrap();
    relinker.on_generated_project(&ws.path("App.csproj"), &DescriptorBuilder::new().build());
    relinker.on_generated_project(&ws.path("Core.Runtime.csproj"), &core_descriptor());
    assert_eq!(relinker.outcomes().len(), 1);

    let report = relink_workspace(&mut relinker, None).unwrap();
    assert_eq!(report.outcomes.len(), 1);
    assert!(report.outcomes[0].is_linked());
}

#[test]
fn absolute_strategy_anchors_at_root() {
    let ws = game_workspace();
    let config = SublinkConfig::new().with_strategy(RewriteStrategy::Absolute);
    let mut relinker = Relinker::new(ws.root(), config).unwrap();
    relink_workspace(&mut relinker, None).unwrap();

    let expected = ws.path("libs").join("Foo.dll");
    let relocated = ws.read("libs/Core/Core.Runtime.csproj");
    assert!(relocated.contains(&format!("<HintPath>{}</HintPath>", expected.display())));
}

#[test]
fn dry_run_writes_nothing() {
    let ws = game_workspace();
    let solution = ws.read("Game.sln");

    let mut relinker = Relinker::new(ws.root(), SublinkConfig::new())
        .unwrap()
        .with_dry_run(true);
    let report = relink_workspace(&mut relinker, None).unwrap();

    assert!(report.dry_run);
    assert!(report.solution_changed);
    assert!(matches!(report.outcomes.as_slice(), [RelocationOutcome::Planned { .. }]));
    assert_eq!(ws.read("Game.sln"), solution);
    assert_eq!(ws.read("Core.Runtime.csproj"), core_descriptor());
    assert!(!ws.exists("libs/Core/Core.Runtime.csproj"));
}

#[test]
fn config_file_selects_subprojects_and_manifest() {
    let ws = TempWorkspace::new();
    ws.write(
        "sublink.toml",
        "manifest_file_name = \".owners\"\nsubprojects = [\"plugins/Audio\"]\n",
    );
    ws.subproject("plugins/Audio", ".owners", &["Audio"]);
    ws.write("Game.sln", &SolutionBuilder::new().project("Audio", "{AU}").build());
    ws.write("Audio.csproj", &DescriptorBuilder::new().build());

    let report = relink(&ws);
    assert_eq!(report.linked(), 1);
    assert!(ws.read("Game.sln").contains("plugins/Audio/Audio.csproj"));
}
