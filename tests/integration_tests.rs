// Integration tests for camconfig
//
// These tests drive the whole pipeline against a temporary /boot layout:
// - overlay scan results -> topology -> wizard -> commit -> extlinux.conf
// - the interactive loop through a scripted frontend
// - the non-interactive --name and --list runs

use std::collections::VecDeque;
use std::fs;

use tempfile::TempDir;

use camconfig::app::{App, AppExit};
use camconfig::config::Settings;
use camconfig::devicetree::OverlayInfo;
use camconfig::hardware::{OverlayDirectoryScan, ScannedOverlay};
use camconfig::headless;
use camconfig::ui::Frontend;
use camconfig::wizard::{Key, MenuView};
use camconfig::{CamConfigError, Result};

const AGX: &str = "tegra234-p3737-camera-fr_";
const WIDE_HEADER: &str = "Jetson AGX CSI Connector";

const EXTLINUX: &str = "TIMEOUT 30
DEFAULT primary

MENU TITLE L4T boot options

LABEL primary
      MENU LABEL primary kernel
      LINUX /boot/Image
      INITRD /boot/initrd
      APPEND ${cbootargs} root=/dev/mmcblk0p1 rw rootwait
";

/// Temporary /boot with overlays, base DTB and extlinux.conf.
struct BootFixture {
    _dir: TempDir,
    settings: Settings,
}

impl BootFixture {
    fn new(installed: &[&str]) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let overlay_dir = dir.path().join("framos/dtbo");
        let dtb_dir = dir.path().join("dtb");
        fs::create_dir_all(&overlay_dir).expect("mkdir overlays");
        fs::create_dir_all(&dtb_dir).expect("mkdir dtb");
        fs::write(dtb_dir.join("kernel_tegra234-p3737-0000+p3701-0005-nv.dtb"), b"")
            .expect("write dtb");
        for name in installed {
            fs::write(overlay_dir.join(name), b"").expect("write overlay");
        }
        let boot_config = dir.path().join("extlinux.conf");
        fs::write(&boot_config, EXTLINUX).expect("write extlinux.conf");

        let settings = Settings {
            overlay_dir,
            boot_config,
            dtb_dir,
            compatible_file: dir.path().join("compatible"),
            reboot_command: vec!["true".to_string()],
            ..Settings::default()
        };
        Self {
            _dir: dir,
            settings,
        }
    }

    fn scan(&self, descriptors: &[&str]) -> OverlayDirectoryScan {
        let overlays = descriptors
            .iter()
            .enumerate()
            .map(|(i, name)| ScannedOverlay {
                file_name: format!("{i}.dtbo"),
                info: OverlayInfo {
                    overlay_name: Some(name.to_string()),
                    header_name: Some(WIDE_HEADER.to_string()),
                    compatible: Vec::new(),
                },
            })
            .collect();
        OverlayDirectoryScan::from_overlays(self.settings.overlay_dir.clone(), overlays)
    }

    fn boot_config(&self) -> String {
        fs::read_to_string(&self.settings.boot_config).expect("read extlinux.conf")
    }

    fn overlays_line(&self) -> String {
        self.boot_config()
            .lines()
            .find(|l| l.trim_start().starts_with("OVERLAYS"))
            .map(str::to_string)
            .unwrap_or_default()
    }
}

/// Frontend that replays a fixed key sequence.
struct ScriptedFrontend {
    keys: VecDeque<Key>,
    views: Vec<MenuView>,
    messages: Vec<Vec<String>>,
    height: u16,
    /// Screen height after the given number of key reads
    resize: Option<(usize, u16)>,
    reads: usize,
}

impl ScriptedFrontend {
    fn new(keys: &[Key]) -> Self {
        Self {
            keys: keys.iter().copied().collect(),
            views: Vec::new(),
            messages: Vec::new(),
            height: 40,
            resize: None,
            reads: 0,
        }
    }
}

impl Frontend for ScriptedFrontend {
    fn render(&mut self, view: &MenuView) -> Result<()> {
        self.views.push(view.clone());
        Ok(())
    }

    fn read_key(&mut self) -> Result<Key> {
        self.reads += 1;
        if let Some((after, height)) = self.resize {
            if self.reads == after {
                self.height = height;
            }
        }
        // Running out of script behaves like Ctrl-C
        Ok(self.keys.pop_front().unwrap_or(Key::Interrupt))
    }

    fn geometry(&self) -> Result<(u16, u16)> {
        Ok((80, self.height))
    }

    fn show_message(&mut self, lines: &[String]) -> Result<()> {
        self.messages.push(lines.to_vec());
        Ok(())
    }
}

const E2E_DESCRIPTORS: [&str; 3] = ["Framos FPA-1.2", "Framos imx900-p0-4Lane", "Framos GMSL-P0"];

fn e2e_overlays() -> Vec<String> {
    vec![
        format!("{AGX}fpa_12-overlay.dtbo"),
        format!("{AGX}imx900-p0-4lane-overlay.dtbo"),
        format!("{AGX}p0-gmsl-overlay.dtbo"),
    ]
}

fn installed(names: &[String]) -> Vec<&str> {
    names.iter().map(String::as_str).collect()
}

/// Board, port, sensor, lanes, then "GMSL".
const CONFIGURE_P0_WITH_GMSL: [Key; 6] = [
    Key::Enter,
    Key::Enter,
    Key::Enter,
    Key::Enter,
    Key::Down,
    Key::Enter,
];

fn save_keys(reboot: bool) -> Vec<Key> {
    let mut keys = CONFIGURE_P0_WITH_GMSL.to_vec();
    // Top level: FPA-1.2 (modified), spacer, save+reboot, save, discard, exit
    keys.push(Key::Back);
    keys.push(Key::Down);
    if !reboot {
        keys.push(Key::Down);
    }
    keys.push(Key::Enter);
    keys
}

#[test]
fn test_interactive_end_to_end() {
    let overlays = e2e_overlays();
    let fixture = BootFixture::new(&installed(&overlays));
    let scan = fixture.scan(&E2E_DESCRIPTORS);

    let mut app = App::new(&fixture.settings, &scan, false).expect("topology");
    let mut frontend = ScriptedFrontend::new(&save_keys(false));
    let exit = app.run(&mut frontend).expect("run");

    let report = match exit {
        AppExit::Saved(report) => report,
        other => panic!("expected Saved, got {other:?}"),
    };
    assert!(report.written);
    assert!(report.skipped.is_empty());

    let expected: Vec<String> = overlays
        .iter()
        .map(|name| fixture.settings.overlay_path(name))
        .collect();
    assert_eq!(fixture.overlays_line(), format!("      OVERLAYS {}", expected.join(",")));
    assert!(fixture.boot_config().contains("      FDT "));

    let message = frontend.messages.last().expect("message shown");
    assert!(message.iter().any(|l| l.ends_with("updated.")));
    assert!(message.iter().any(|l| l == "Reboot the System to apply changes."));
}

#[test]
fn test_save_and_reboot_requests_reboot() {
    let overlays = e2e_overlays();
    let fixture = BootFixture::new(&installed(&overlays));
    let scan = fixture.scan(&E2E_DESCRIPTORS);

    let mut app = App::new(&fixture.settings, &scan, false).expect("topology");
    let mut frontend = ScriptedFrontend::new(&save_keys(true));
    assert!(matches!(app.run(&mut frontend).expect("run"), AppExit::Reboot(_)));
}

#[test]
fn test_dry_run_never_reboots_or_writes() {
    let overlays = e2e_overlays();
    let fixture = BootFixture::new(&installed(&overlays));
    let scan = fixture.scan(&E2E_DESCRIPTORS);

    let mut app = App::new(&fixture.settings, &scan, true).expect("topology");
    let mut frontend = ScriptedFrontend::new(&save_keys(true));
    match app.run(&mut frontend).expect("run") {
        AppExit::Saved(report) => {
            assert!(!report.written);
            assert!(report.rendered.is_some_and(|t| t.contains("OVERLAYS")));
        }
        other => panic!("expected Saved, got {other:?}"),
    }
    assert_eq!(fixture.boot_config(), EXTLINUX);
}

#[test]
fn test_applying_twice_is_idempotent() {
    let overlays = e2e_overlays();
    let fixture = BootFixture::new(&installed(&overlays));
    let scan = fixture.scan(&E2E_DESCRIPTORS);

    for _ in 0..2 {
        let mut app = App::new(&fixture.settings, &scan, false).expect("topology");
        app.run(&mut ScriptedFrontend::new(&save_keys(false))).expect("run");
    }
    let text = fixture.boot_config();
    assert_eq!(text.matches("FDT ").count(), 1);
    assert_eq!(text.matches("OVERLAYS ").count(), 1);
}

#[test]
fn test_quit_without_selection_writes_nothing() {
    let fixture = BootFixture::new(&installed(&e2e_overlays()));
    let scan = fixture.scan(&E2E_DESCRIPTORS);

    let mut app = App::new(&fixture.settings, &scan, false).expect("topology");
    // Top level without a selection: FPA-1.2, spacer, Exit
    let mut frontend = ScriptedFrontend::new(&[Key::Down, Key::Enter]);
    assert_eq!(app.run(&mut frontend).expect("run"), AppExit::Quit);
    assert_eq!(fixture.boot_config(), EXTLINUX);
    assert!(frontend.messages.is_empty());
}

#[test]
fn test_missing_gmsl_overlay_skips_port_with_warning() {
    let overlays = e2e_overlays();
    let fixture = BootFixture::new(&installed(&overlays[..2]));
    let scan = fixture.scan(&E2E_DESCRIPTORS);

    let mut app = App::new(&fixture.settings, &scan, false).expect("topology");
    let mut frontend = ScriptedFrontend::new(&save_keys(false));
    let report = match app.run(&mut frontend).expect("run") {
        AppExit::Saved(report) => report,
        other => panic!("expected Saved, got {other:?}"),
    };
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(
        fixture.overlays_line(),
        format!("      OVERLAYS {}", fixture.settings.overlay_path(&overlays[0]))
    );
    let message = frontend.messages.last().expect("message shown");
    assert!(message[0].contains("p0 will not be configured"));
}

#[test]
fn test_missing_board_overlay_is_fatal_interactively() {
    let overlays = e2e_overlays();
    let fixture = BootFixture::new(&installed(&overlays[1..]));
    let scan = fixture.scan(&E2E_DESCRIPTORS);

    let mut app = App::new(&fixture.settings, &scan, false).expect("topology");
    let err = app.run(&mut ScriptedFrontend::new(&save_keys(false))).unwrap_err();
    assert!(matches!(err, CamConfigError::BoardOverlayMissing { .. }));
    assert_eq!(fixture.boot_config(), EXTLINUX);
}

#[test]
fn test_topology_errors_surface_before_the_menu() {
    let fixture = BootFixture::new(&[]);

    let no_board = fixture.scan(&["Framos imx900-p0-4Lane"]);
    assert!(matches!(
        App::new(&fixture.settings, &no_board, false).err(),
        Some(CamConfigError::NoAddOnBoard)
    ));

    let unknown = OverlayDirectoryScan::from_overlays(fixture.settings.overlay_dir.clone(), Vec::new());
    assert!(matches!(
        App::new(&fixture.settings, &unknown, false).err(),
        Some(CamConfigError::UnknownConnector(_))
    ));
}

#[test]
fn test_short_screen_shrinks_pages() {
    let fixture = BootFixture::new(&[]);
    let mut descriptors = vec!["Framos FPA-1".to_string()];
    descriptors.extend((0..12).map(|i| format!("Framos imx{i:03}-P0-2Lane")));
    let names: Vec<&str> = descriptors.iter().map(String::as_str).collect();
    let scan = fixture.scan(&names);

    let mut app = App::new(&fixture.settings, &scan, false).expect("topology");
    let mut frontend = ScriptedFrontend::new(&[Key::Enter, Key::Enter]);
    frontend.height = 17; // 10 rows for the menu
    assert_eq!(app.run(&mut frontend).expect("run"), AppExit::Quit);
    assert_eq!(app.wizard().page_capacity(), 10);

    let sensor_menu = frontend.views.last().expect("rendered");
    assert_eq!(sensor_menu.rows.len(), 10);
    assert!(sensor_menu.rows[9].label.contains("1/3"));
}

#[test]
fn test_resize_refits_pages() {
    let fixture = BootFixture::new(&[]);
    let mut descriptors = vec!["Framos FPA-1".to_string()];
    descriptors.extend((0..12).map(|i| format!("Framos imx{i:03}-P0-2Lane")));
    let names: Vec<&str> = descriptors.iter().map(String::as_str).collect();
    let scan = fixture.scan(&names);

    let mut app = App::new(&fixture.settings, &scan, false).expect("topology");
    // Tall screen for the top level, shrunk once the board is opened
    let mut frontend = ScriptedFrontend::new(&[Key::Enter, Key::Enter]);
    frontend.resize = Some((1, 17));
    assert_eq!(app.run(&mut frontend).expect("run"), AppExit::Quit);

    assert_eq!(frontend.views[0].rows.len(), 3);
    assert_eq!(app.wizard().page_capacity(), 10);
    let sensor_menu = frontend.views.last().expect("rendered");
    assert_eq!(sensor_menu.rows.len(), 10);
    assert!(sensor_menu.rows[9].label.contains("1/3"));
}

#[test]
fn test_headless_apply_and_list() {
    let overlays = e2e_overlays();
    let fixture = BootFixture::new(&installed(&overlays));
    let scan = fixture.scan(&E2E_DESCRIPTORS);

    let mut out = Vec::new();
    headless::list(&scan, &mut out).expect("list");
    let listing = String::from_utf8(out).expect("utf-8");
    assert!(listing.starts_with(&format!("Header: {WIDE_HEADER}\n")));
    assert!(listing.contains("  Framos imx900-p0-4Lane\n"));

    let modules = vec![
        "Framos FPA-1.2".to_string(),
        "Framos imx900-p0-4Lane-GMSL".to_string(),
    ];
    let mut out = Vec::new();
    let report = headless::apply_modules(&modules, &fixture.settings, &scan, false, &mut out)
        .expect("apply");
    assert!(report.written);
    let printed = String::from_utf8(out).expect("utf-8");
    assert!(printed.ends_with("updated.\nReboot the System to apply changes.\n"));
    assert!(fixture.overlays_line().ends_with(&format!("{AGX}p0-gmsl-overlay.dtbo")));
}

#[test]
fn test_headless_missing_sensor_overlay_is_fatal() {
    let overlays = e2e_overlays();
    let fixture = BootFixture::new(&installed(&overlays[..1]));
    let scan = fixture.scan(&E2E_DESCRIPTORS);

    let modules = vec![
        "Framos FPA-1.2".to_string(),
        "Framos imx900-p0-4Lane".to_string(),
    ];
    let err = headless::apply_modules(&modules, &fixture.settings, &scan, false, &mut Vec::new())
        .unwrap_err();
    assert!(matches!(err, CamConfigError::OverlayMissing { .. }));
    assert_eq!(fixture.boot_config(), EXTLINUX);
}

#[test]
fn test_settings_file_drives_paths() {
    let fixture = BootFixture::new(&[]);
    let path = fixture.settings.overlay_dir.join("../settings.json");
    fixture.settings.save_to_file(&path).expect("save");
    let loaded = Settings::load_from_file(&path).expect("load");
    assert_eq!(loaded, fixture.settings);
}
