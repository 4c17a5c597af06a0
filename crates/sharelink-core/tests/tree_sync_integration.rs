//! Integration tests for share-to-project synchronization.
//!
//! These tests build real share and project trees under a temporary
//! directory and check the filesystem after each run.

#![cfg(unix)]

use sharelink_core::{link, setup_share_symlinks, SyncConfig, TreeSynchronizer};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Test fixture holding a share tree and an empty project tree.
struct TestFixture {
    _temp_dir: TempDir,
    share: PathBuf,
    project: PathBuf,
}

impl TestFixture {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        // Canonical so expected link targets match what the engine resolves
        let base = temp_dir
            .path()
            .canonicalize()
            .expect("Failed to canonicalize temp dir");

        let share = base.join("share");
        let project = base.join("project");
        fs::create_dir_all(&share).expect("Failed to create share dir");
        fs::create_dir_all(&project).expect("Failed to create project dir");

        Self {
            _temp_dir: temp_dir,
            share,
            project,
        }
    }

    fn share_file(&self, rel: &str) -> PathBuf {
        let path = self.share.join(rel);
        fs::create_dir_all(path.parent().unwrap()).expect("Failed to create parent");
        fs::write(&path, rel).expect("Failed to write share file");
        path
    }

    fn share_dir(&self, rel: &str) -> PathBuf {
        let path = self.share.join(rel);
        fs::create_dir_all(&path).expect("Failed to create share dir");
        path
    }

    fn synchronizer(&self) -> TreeSynchronizer {
        TreeSynchronizer::new(&self.project, &self.share)
    }

    fn dest(&self, rel: &str) -> PathBuf {
        self.project.join(rel)
    }

    fn assert_links_to(&self, rel: &str, source: &Path) {
        let dest = self.dest(rel);
        assert!(link::is_link(&dest), "{} should be a symlink", rel);
        assert_eq!(fs::read_link(&dest).unwrap(), source, "wrong target for {}", rel);
    }
}

fn paths(items: &[&str]) -> Vec<PathBuf> {
    items.iter().map(PathBuf::from).collect()
}

#[test]
fn test_scenario_first_run() {
    let fixture = TestFixture::new();
    let checkpoint = fixture.share_file("models/checkpoints/a.safetensors");
    let loras = fixture.share_dir("models/loras");

    let outcome = fixture.synchronizer().create_symlinks();

    let models = fixture.dest("models");
    assert!(models.is_dir());
    assert!(!link::is_link(&models));
    assert!(!link::is_link(&fixture.dest("models/checkpoints")));
    fixture.assert_links_to("models/checkpoints/a.safetensors", &checkpoint);
    fixture.assert_links_to("models/loras", &loras);
    assert!(!fixture.dest("custom_nodes").exists());

    assert_eq!(outcome.directories, paths(&["models", "models/checkpoints"]));
    assert_eq!(
        outcome.links,
        paths(&["models/checkpoints/a.safetensors", "models/loras"])
    );
    assert!(outcome.skipped.contains(&"custom_nodes".to_string()));
}

#[test]
fn test_scenario_second_run_picks_up_new_file() {
    let fixture = TestFixture::new();
    let first = fixture.share_file("models/checkpoints/a.safetensors");
    let loras = fixture.share_dir("models/loras");
    let sync = fixture.synchronizer();
    sync.create_symlinks();

    let second = fixture.share_file("models/checkpoints/b.safetensors");
    let outcome = sync.create_symlinks();

    assert_eq!(outcome.links, paths(&["models/checkpoints/b.safetensors"]));
    assert!(outcome.directories.is_empty());
    fixture.assert_links_to("models/checkpoints/a.safetensors", &first);
    fixture.assert_links_to("models/checkpoints/b.safetensors", &second);
    fixture.assert_links_to("models/loras", &loras);
}

#[test]
fn test_second_run_is_idempotent() {
    let fixture = TestFixture::new();
    fixture.share_file("models/checkpoints/a.safetensors");
    fixture.share_file("models/readme.txt");
    fixture.share_dir("models/empty/nested");
    fixture.share_file("input/image.png");
    fixture.share_dir("user");
    let sync = fixture.synchronizer();

    let first = sync.create_symlinks();
    assert!(!first.is_empty());

    let second = sync.create_symlinks();
    assert!(second.is_empty());
    assert_eq!(second.total_changes(), 0);
}

#[test]
fn test_existing_destination_entries_are_untouched() {
    let fixture = TestFixture::new();
    fixture.share_file("models/config.yaml");
    fixture.share_file("models/vae/model.bin");
    fixture.share_file("models/clip/clip.bin");
    fixture.share_file("models/upscale/x4.bin");

    // A real file, a real directory and a foreign link already in place
    fs::create_dir_all(fixture.dest("models/vae")).unwrap();
    fs::write(fixture.dest("models/config.yaml"), "local").unwrap();
    let elsewhere = fixture.project.join("elsewhere");
    fs::create_dir_all(&elsewhere).unwrap();
    std::os::unix::fs::symlink(&elsewhere, fixture.dest("models/clip")).unwrap();

    let outcome = fixture.synchronizer().create_symlinks();

    let config = fixture.dest("models/config.yaml");
    assert!(!link::is_link(&config));
    assert_eq!(fs::read_to_string(&config).unwrap(), "local");

    // Existing directory keeps receiving new entries
    assert!(!link::is_link(&fixture.dest("models/vae")));
    assert!(link::is_link(&fixture.dest("models/vae/model.bin")));

    // Foreign link is never followed or written through
    assert_eq!(fs::read_link(fixture.dest("models/clip")).unwrap(), elsewhere);
    assert!(!elsewhere.join("clip.bin").exists());

    assert!(!outcome.links.contains(&PathBuf::from("models/config.yaml")));
    assert!(outcome.links.contains(&PathBuf::from("models/upscale/x4.bin")));
}

#[test]
fn test_dangling_destination_link_is_left_alone() {
    let fixture = TestFixture::new();
    fixture.share_file("input/photo.jpg");
    fs::create_dir_all(fixture.dest("input")).unwrap();
    let missing = fixture.project.join("nowhere.jpg");
    std::os::unix::fs::symlink(&missing, fixture.dest("input/photo.jpg")).unwrap();

    let outcome = fixture.synchronizer().create_symlinks();

    assert!(outcome.links.is_empty());
    assert_eq!(fs::read_link(fixture.dest("input/photo.jpg")).unwrap(), missing);
}

#[test]
fn test_files_are_linked_inside_mixed_directory() {
    let fixture = TestFixture::new();
    let readme = fixture.share_file("models/readme.md");
    let weights = fixture.share_file("models/checkpoints/sd.ckpt");
    let notes = fixture.share_file("models/checkpoints/notes.txt");
    let embeddings = fixture.share_dir("models/checkpoints/embeddings");

    fixture.synchronizer().create_symlinks();

    assert!(!link::is_link(&fixture.dest("models")));
    assert!(!link::is_link(&fixture.dest("models/checkpoints")));
    assert!(fixture.dest("models/checkpoints").is_dir());
    fixture.assert_links_to("models/readme.md", &readme);
    fixture.assert_links_to("models/checkpoints/sd.ckpt", &weights);
    fixture.assert_links_to("models/checkpoints/notes.txt", &notes);
    fixture.assert_links_to("models/checkpoints/embeddings", &embeddings);
}

#[test]
fn test_file_free_subdirectory_becomes_single_link() {
    let fixture = TestFixture::new();
    fixture.share_file("models/readme.md");
    let tree = fixture.share_dir("models/controlnet");
    fixture.share_dir("models/controlnet/a/b");
    fixture.share_dir("models/controlnet/c");

    let outcome = fixture.synchronizer().create_symlinks();

    fixture.assert_links_to("models/controlnet", &tree);
    let controlnet_links: Vec<_> = outcome
        .links
        .iter()
        .filter(|p| p.starts_with("models/controlnet"))
        .collect();
    assert_eq!(controlnet_links, vec![&PathBuf::from("models/controlnet")]);
    assert!(!outcome
        .directories
        .iter()
        .any(|p| p.starts_with("models/controlnet")));
}

#[test]
fn test_file_free_top_level_becomes_single_link() {
    let fixture = TestFixture::new();
    let user = fixture.share_dir("user");
    fixture.share_dir("user/default/workflows");

    let outcome = fixture.synchronizer().create_symlinks();

    fixture.assert_links_to("user", &user);
    assert_eq!(outcome.links, paths(&["user"]));
    assert!(outcome.directories.is_empty());
    assert_eq!(fixture.synchronizer().list_symlinks(), vec!["user".to_string()]);
}

#[test]
fn test_linked_top_level_is_terminal() {
    let fixture = TestFixture::new();
    fixture.share_dir("output/2024");
    let sync = fixture.synchronizer();
    sync.create_symlinks();
    assert!(link::is_link(&fixture.dest("output")));

    // A file appearing later does not demote the link to a directory
    fixture.share_file("output/2024/render.png");
    let outcome = sync.create_symlinks();

    assert!(outcome.is_empty());
    assert!(outcome.skipped.contains(&"output".to_string()));
    assert!(link::is_link(&fixture.dest("output")));
    assert!(fixture.dest("output/2024/render.png").exists());
}

#[test]
fn test_unreadable_subdirectory_does_not_stop_siblings() {
    use std::os::unix::fs::PermissionsExt;

    let fixture = TestFixture::new();
    fixture.share_file("models/locked/secret.bin");
    let open = fixture.share_file("models/open/a.bin");
    let image = fixture.share_file("input/b.png");
    let locked = fixture.share.join("models/locked");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    if fs::read_dir(&locked).is_ok() {
        // Privileged processes ignore directory permissions
        eprintln!("Skipping permission test - directory is still readable");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let outcome = fixture.synchronizer().create_symlinks();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

    fixture.assert_links_to("models/open/a.bin", &open);
    fixture.assert_links_to("input/b.png", &image);
    assert!(!fixture.dest("models/locked").exists());
    assert!(outcome.links.contains(&PathBuf::from("models/open/a.bin")));
    assert!(outcome.links.contains(&PathBuf::from("input/b.png")));
}

#[test]
fn test_missing_share_creates_nothing() {
    let fixture = TestFixture::new();
    let sync = TreeSynchronizer::new(&fixture.project, fixture.share.join("absent"));

    let outcome = sync.create_symlinks();

    assert!(outcome.is_empty());
    assert!(outcome.skipped.is_empty());
    assert_eq!(fs::read_dir(&fixture.project).unwrap().count(), 0);
}

#[test]
fn test_only_configured_names_are_synced() {
    let fixture = TestFixture::new();
    fixture.share_file("models/a.bin");
    fixture.share_file("extras/b.bin");
    let sync = fixture.synchronizer().with_targets(["models"]).unwrap();

    let outcome = sync.create_symlinks();

    assert_eq!(outcome.links, paths(&["models/a.bin"]));
    assert!(!fixture.dest("extras").exists());
}

#[test]
fn test_remove_symlinks_only_removes_links() {
    let fixture = TestFixture::new();
    fixture.share_dir("user/profiles");
    fixture.share_dir("output");
    fs::create_dir_all(fixture.dest("input")).unwrap();
    fs::write(fixture.dest("input/keep.txt"), "keep").unwrap();
    let sync = fixture.synchronizer();
    sync.create_symlinks();
    // A link outside the configured names survives too
    std::os::unix::fs::symlink(&fixture.share, fixture.dest("extra")).unwrap();

    let mut listed = sync.list_symlinks();
    listed.sort();
    assert_eq!(listed, vec!["output".to_string(), "user".to_string()]);

    let removed = sync.remove_symlinks();

    assert_eq!(removed, vec!["output".to_string(), "user".to_string()]);
    assert!(fixture.dest("user").symlink_metadata().is_err());
    assert!(fixture.dest("output").symlink_metadata().is_err());
    assert!(fixture.share.join("user/profiles").is_dir());
    assert_eq!(fs::read_to_string(fixture.dest("input/keep.txt")).unwrap(), "keep");
    assert!(link::is_link(&fixture.dest("extra")));
    assert!(sync.list_symlinks().is_empty());
}

#[test]
fn test_inspect_classifies_every_name() {
    let fixture = TestFixture::new();
    let user = fixture.share_dir("user");
    fixture.share_dir("output/renders");
    fixture.share_file("input/a.png");
    fixture.share_dir("custom_nodes");
    fs::create_dir_all(fixture.dest("input")).unwrap();
    let sync = fixture.synchronizer();
    sync.create_symlinks();
    fs::remove_dir_all(fixture.share.join("output")).unwrap();

    let report = sync.inspect();

    assert_eq!(report.len(), 5);
    let info = &report.symlinks["user"];
    assert_eq!(info.target, fixture.dest("user"));
    assert_eq!(info.source, user);
    assert!(info.exists);
    assert!(!report.symlinks["output"].exists);
    assert_eq!(report.broken_links().collect::<Vec<_>>(), vec!["output"]);
    assert_eq!(report.existing_directories["input"], fixture.dest("input"));
    assert_eq!(
        report.missing_in_share["models"].share_path,
        fixture.share.join("models")
    );
    assert!(!report.missing_in_share["models"].available_in_share);
    // custom_nodes was linked as an empty directory
    assert!(report.symlinks.contains_key("custom_nodes"));
}

#[test]
fn test_setup_share_symlinks_runs_one_pass() {
    let fixture = TestFixture::new();
    let file = fixture.share_file("input/a.png");

    let outcome = setup_share_symlinks(&fixture.project, Some(fixture.share.as_path()));

    assert_eq!(outcome.links, paths(&["input/a.png"]));
    fixture.assert_links_to("input/a.png", &file);
}

#[test]
fn test_from_config_uses_configured_targets() {
    let fixture = TestFixture::new();
    fixture.share_file("loras/style.safetensors");
    fixture.share_file("models/a.bin");
    let config = SyncConfig::new(&fixture.project, &fixture.share)
        .with_targets(["loras"])
        .unwrap();

    let outcome = TreeSynchronizer::from_config(&config).create_symlinks();

    assert_eq!(outcome.links, paths(&["loras/style.safetensors"]));
    assert!(!fixture.dest("models").exists());
}
