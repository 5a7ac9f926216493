//! Testing utilities for sublink workspace
//!
//! Shared fixtures: generator-shaped solution and descriptor text, and
//! throwaway on-disk workspaces.

#![allow(missing_docs)]
#![allow(clippy::missing_panics_doc)]

use std::fs;
use std::path::{Path, PathBuf};
use sublink_model::ProjectRecord;
use tempfile::TempDir;

pub const CSHARP_PROJECT_TYPE: &str = "{FAE04EC0-301F-11D3-BF4B-00C04F79EFBC}";
pub const CRLF: &str = "\r\n";

pub fn project_declaration(group_id: &str, name: &str, path: &str, id: &str) -> String {
    format!("Project(\"{group_id}\") = \"{name}\", \"{path}\", \"{id}\"")
}

pub fn record(name: &str, id: &str) -> ProjectRecord {
    ProjectRecord::new(CSHARP_PROJECT_TYPE, name, format!("{name}.csproj"), id)
}

/// Builds solution text the way the IDE generator lays it out
#[derive(Debug, Default, Clone)]
pub struct SolutionBuilder {
    projects: Vec<(String, String, String)>,
}

impl SolutionBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a project at `<name>.csproj`
    #[must_use]
    pub fn project(self, name: &str, id: &str) -> Self {
        let path = format!("{name}.csproj");
        self.project_at(name, &path, id)
    }

    #[must_use]
    pub fn project_at(mut self, name: &str, path: &str, id: &str) -> Self {
        self.projects
            .push((name.to_string(), path.to_string(), id.to_string()));
        self
    }

    #[must_use]
    pub fn build(&self) -> String {
        let mut lines = vec![
            String::new(),
            "Microsoft Visual Studio Solution File, Format Version 11.00".to_string(),
            "# Visual Studio 2010".to_string(),
        ];
        for (name, path, id) in &self.projects {
            lines.push(project_declaration(CSHARP_PROJECT_TYPE, name, path, id));
            lines.push("EndProject".to_string());
        }
        lines.extend(
            [
                "Global",
                "\tGlobalSection(SolutionConfigurationPlatforms) = preSolution",
                "\t\tDebug|Any CPU = Debug|Any CPU",
                "\tEndGlobalSection",
                "EndGlobal",
                "",
            ]
            .map(String::from),
        );
        lines.join(CRLF)
    }
}

/// Builds a project descriptor with the path-bearing elements the generator emits
#[derive(Debug, Clone)]
pub struct DescriptorBuilder {
    output_path: String,
    no_warn: Option<String>,
    compiles: Vec<String>,
    hint_paths: Vec<(String, String)>,
    project_refs: Vec<String>,
}

impl Default for DescriptorBuilder {
    fn default() -> Self {
        Self {
            output_path: r"Temp\bin\Debug\".to_string(),
            no_warn: Some("0169".to_string()),
            compiles: Vec::new(),
            hint_paths: Vec::new(),
            project_refs: Vec::new(),
        }
    }
}

impl DescriptorBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn output_path(mut self, path: &str) -> Self {
        self.output_path = path.to_string();
        self
    }

    #[must_use]
    pub fn no_warn(mut self, codes: Option<&str>) -> Self {
        self.no_warn = codes.map(String::from);
        self
    }

    #[must_use]
    pub fn compile(mut self, path: &str) -> Self {
        self.compiles.push(path.to_string());
        self
    }

    #[must_use]
    pub fn hint_path(mut self, assembly: &str, path: &str) -> Self {
        self.hint_paths.push((assembly.to_string(), path.to_string()));
        self
    }

    #[must_use]
    pub fn project_reference(mut self, path: &str) -> Self {
        self.project_refs.push(path.to_string());
        self
    }

    #[must_use]
    pub fn build(&self) -> String {
        let mut lines = vec![
            r#"<?xml version="1.0" encoding="utf-8"?>"#.to_string(),
            r#"<Project ToolsVersion="4.0" DefaultTargets="Build" xmlns="http://schemas.microsoft.com/developer/msbuild/2003">"#.to_string(),
            "  <PropertyGroup>".to_string(),
            "    <LangVersion>latest</LangVersion>".to_string(),
            "  </PropertyGroup>".to_string(),
            r#"  <PropertyGroup Condition=" '$(Configuration)|$(Platform)' == 'Debug|AnyCPU' ">"#.to_string(),
            "    <DebugSymbols>true</DebugSymbols>".to_string(),
            format!("    <OutputPath>{}</OutputPath>", self.output_path),
        ];
        if let Some(codes) = &self.no_warn {
            lines.push(format!("    <NoWarn>{codes}</NoWarn>"));
        }
        lines.push("  </PropertyGroup>".to_string());

        lines.push("  <ItemGroup>".to_string());
        for path in &self.compiles {
            lines.push(format!(r#"    <Compile Include="{path}" />"#));
        }
        lines.push("  </ItemGroup>".to_string());

        lines.push("  <ItemGroup>".to_string());
        for (assembly, path) in &self.hint_paths {
            lines.push(format!(r#"    <Reference Include="{assembly}">"#));
            lines.push(format!("      <HintPath>{path}</HintPath>"));
            lines.push("    </Reference>".to_string());
        }
        lines.push("  </ItemGroup>".to_string());

        lines.push("  <ItemGroup>".to_string());
        for path in &self.project_refs {
            lines.push(format!(r#"    <ProjectReference Include="{path}">"#));
            lines.push("      <Project>{00000000-0000-0000-0000-000000000000}</Project>".to_string());
            lines.push("    </ProjectReference>".to_string());
        }
        lines.push("  </ItemGroup>".to_string());

        lines.push("</Project>".to_string());
        lines.push(String::new());
        lines.join(CRLF)
    }
}

/// A throwaway workspace root on disk
#[derive(Debug)]
pub struct TempWorkspace {
    dir: TempDir,
}

impl TempWorkspace {
    #[must_use]
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    #[must_use]
    pub fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    /// Write `content` at `relative`, creating parent directories
    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    /// Create a sub-project directory with an ownership manifest listing `names`
    pub fn subproject(&self, dir: &str, manifest_file_name: &str, names: &[&str]) -> PathBuf {
        let mut content = names.join("\n");
        content.push('\n');
        self.write(&format!("{dir}/{manifest_file_name}"), &content);
        self.path(dir)
    }

    #[must_use]
    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.path(relative)).unwrap()
    }

    #[must_use]
    pub fn exists(&self, relative: &str) -> bool {
        self.path(relative).exists()
    }
}

impl Default for TempWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

/// Inode identity check for hard links
#[cfg(unix)]
#[must_use]
pub fn same_file(a: &Path, b: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;
    let (Ok(a), Ok(b)) = (fs::metadata(a), fs::metadata(b)) else {
        return false;
    };
    a.dev() == b.dev() && a.ino() == b.ino()
}

/// Content identity check where inode numbers are unavailable
#[cfg(not(unix))]
#[must_use]
pub fn same_file(a: &Path, b: &Path) -> bool {
    matches!((fs::read(a), fs::read(b)), (Ok(a), Ok(b)) if a == b)
}
