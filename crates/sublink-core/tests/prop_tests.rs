use std::path::Path;

use proptest::prelude::*;
use sublink_core::prelude::*;
use sublink_core::StaticSubprojects;
use sublink_rewrite::solution::parse_records;
use sublink_test_utils::{DescriptorBuilder, SolutionBuilder, TempWorkspace};

fn project_name() -> impl Strategy<Value = String> {
    "[A-Z][a-z]{1,6}(\\.[A-Z][a-z]{1,6})?"
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_solution_ids_unique_and_owned_paths_relocated(
        projects in proptest::collection::vec((project_name(), 0..6u8, any::<bool>()), 1..12)
    ) {
        let ws = TempWorkspace::new();
        let owned: Vec<&str> = projects
            .iter()
            .filter(|(_, _, owned)| *owned)
            .map(|(name, _, _)| name.as_str())
            .collect();
        ws.subproject("libs/Owned", ".sublink", &owned);

        let mut builder = SolutionBuilder::new();
        for (name, id, _) in &projects {
            builder = builder.project(name, &format!("{{ID-{id}}}"));
        }
        let text = builder.build();

        let mut relinker = Relinker::new(ws.root(), SublinkConfig::new())
            .unwrap()
            .with_source(Box::new(StaticSubprojects::new(["libs/Owned"])));
        let out = relinker.on_generated_solution(&ws.path("Game.sln"), &text);
        let records = parse_records(&out);

        let mut expected_ids: Vec<String> = Vec::new();
        for (_, id, _) in &projects {
            let id = format!("{{ID-{id}}}");
            if !expected_ids.contains(&id) {
                expected_ids.push(id);
            }
        }
        let ids: Vec<String> = records.iter().map(|r| r.id.as_str().to_string()).collect();
        prop_assert_eq!(ids, expected_ids);

        for record in &records {
            let is_owned = owned.iter().any(|n| n.eq_ignore_ascii_case(&record.name));
            let expected = if is_owned {
                format!("libs/Owned/{}.csproj", record.name)
            } else {
                format!("{}.csproj", record.name)
            };
            prop_assert_eq!(&record.declared_path, &expected);
        }
    }

    #[test]
    fn prop_descriptor_callback_is_idempotent(
        hint in "[A-Za-z]{1,5}(\\\\[A-Za-z]{1,5}){0,3}\\.dll",
        depth in 1..4usize,
    ) {
        let ws = TempWorkspace::new();
        let owner = (0..depth).map(|i| format!("d{i}")).collect::<Vec<_>>().join("/");
        ws.subproject(&owner, ".sublink", &["Core"]);

        let mut relinker = Relinker::new(ws.root(), SublinkConfig::new().with_subprojects([owner.as_str()]))
            .unwrap()
            .with_dry_run(true);
        let descriptor = DescriptorBuilder::new().hint_path("Hint", &hint).build();
        let path = Path::new("Core.csproj");

        let once = relinker.on_generated_project(path, &descriptor);
        let twice = relinker.on_generated_project(path, &once);
        prop_assert_eq!(&once, &twice);

        let prefix = "..\\".repeat(depth);
        let expected_hint = format!("<HintPath>{prefix}{hint}</HintPath>");
        prop_assert!(once.contains(&expected_hint));
    }
}
