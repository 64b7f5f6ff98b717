#![allow(dead_code)]

pub mod mock_converter;

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};
use std::fs;
use tempfile::TempDir;
use vrtools::config::Config;
use vrtools::host::{SceneHost, Stage};

/// A small car scene with legacy materials and a replacement library
pub fn sample_stage() -> Stage {
    let mut stage = Stage::new();
    stage.define_prim("/World/Looks/Chrome_Plastic", "Material").unwrap();
    stage.define_prim("/World/Looks/Leather_Seat", "Material").unwrap();
    stage.define_prim("/Library/Plastic_Chrome", "Material").unwrap();
    stage.define_prim("/Library/Metal_Trim", "Material").unwrap();
    stage.define_prim("/World/Car", "Xform").unwrap();
    stage.define_prim("/World/Car/Grille", "Mesh").unwrap();
    stage.define_prim("/World/Car/Mirror", "Mesh").unwrap();
    stage.define_prim("/World/Car/Seat", "Mesh").unwrap();
    stage
        .bind_material(
            &["/World/Car/Grille".to_string(), "/World/Car/Mirror".to_string()],
            "/World/Looks/Chrome_Plastic",
        )
        .unwrap();
    stage
        .bind_material(&["/World/Car/Seat".to_string()], "/World/Looks/Leather_Seat")
        .unwrap();
    stage
}

/// A temp dir holding a stage file and a config, plus a way to run the CLI
/// against them with an isolated config home
pub struct TestContext {
    pub temp_dir: TempDir,
    pub stage_path: PathBuf,
    pub config_path: PathBuf,
}

impl TestContext {
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let stage_path = temp_dir.path().join("scene.json");
        let config_path = temp_dir.path().join("config.json");

        sample_stage()
            .save(&stage_path)
            .expect("Failed to write stage");
        Config::default()
            .save_to(&config_path)
            .expect("Failed to write config");

        Self {
            temp_dir,
            stage_path,
            config_path,
        }
    }

    /// Config home the binary sees (`$XDG_CONFIG_HOME`)
    pub fn config_home(&self) -> PathBuf {
        self.temp_dir.path().join("config")
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_vrtools"));
        cmd.arg("--stage")
            .arg(&self.stage_path)
            .arg("--config")
            .arg(&self.config_path)
            .args(args)
            .env("XDG_CONFIG_HOME", self.config_home())
            .env_remove("RUST_LOG");
        cmd
    }

    pub fn run(&self, args: &[&str]) -> Output {
        self.command(args)
            .stdin(Stdio::null())
            .output()
            .expect("Failed to run vrtools")
    }

    /// Run with `input` piped to stdin
    pub fn run_with_stdin(&self, args: &[&str], input: &str) -> Output {
        let mut child = self
            .command(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("Failed to spawn vrtools");
        child
            .stdin
            .take()
            .expect("stdin not piped")
            .write_all(input.as_bytes())
            .expect("Failed to write stdin");
        child.wait_with_output().expect("Failed to wait for vrtools")
    }

    /// Reload the stage file the CLI wrote
    pub fn stage(&self) -> Stage {
        Stage::load(&self.stage_path).expect("Failed to reload stage")
    }

    pub fn binding(&self, path: &str) -> Option<String> {
        self.stage().material_binding(path).expect("Missing prim")
    }

    pub fn stage_json(&self) -> String {
        fs::read_to_string(&self.stage_path).expect("Failed to read stage")
    }
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}
