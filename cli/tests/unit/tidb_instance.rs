//! Tests for the `tidb` application service: port resolution, launch-command
//! assembly and the launch state machine.
//!
//! All I/O goes through fakes and mocks from `helpers`; nothing is spawned.

#![allow(clippy::expect_used)]

use std::path::{Path, PathBuf};

use tokio_util::sync::CancellationToken;

use tiplay_cli::application::ports::ComponentProcess;
use tiplay_cli::application::services::tidb::{TidbInstance, TidbParams};
use tiplay_cli::domain::{ComponentVersion, InstanceError, InstanceState, PdPeer, TidbConfig};
use tiplay_cli::infra::config::TomlConfigDecoder;
use tiplay_cli::infra::port::FreePortAllocator;

use crate::helpers::{
    FailAt, FakeProcess, FakeSpawner, FixedHosts, GrantingPorts, MockConfig, MockPorts, NoConfig,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn version() -> ComponentVersion {
    "v7.5.0".parse().expect("version")
}

fn pd(addr: &str) -> PdPeer {
    addr.parse().expect("peer")
}

fn params<'a>(config_path: &'a Path, peers: &'a [PdPeer], enable_binlog: bool) -> TidbParams<'a> {
    TidbParams {
        bin_path: Path::new("./tidb-server"),
        dir: Path::new("/tmp/n1"),
        host: "0.0.0.0",
        config_path,
        id: 0,
        peers,
        enable_binlog,
    }
}

fn build(ports: &GrantingPorts, params: TidbParams<'_>) -> TidbInstance<FakeProcess> {
    TidbInstance::new(ports, &NoConfig, &FixedHosts, params).expect("resolve")
}

fn instance_error(err: &anyhow::Error) -> &InstanceError {
    err.downcast_ref::<InstanceError>()
        .unwrap_or_else(|| panic!("not an InstanceError: {err:#}"))
}

// ── Descriptor resolution ─────────────────────────────────────────────────────

#[test]
fn empty_config_path_prefers_default_ports_and_skips_decoding() {
    let mut config = MockConfig::new();
    config.expect_decode().never();
    let mut ports = MockPorts::new();
    ports
        .expect_free_port()
        .withf(|host, preferred| host == "0.0.0.0" && *preferred == 4000)
        .times(1)
        .returning(|_, p| Ok(p));
    ports
        .expect_free_port()
        .withf(|host, preferred| host == "0.0.0.0" && *preferred == 10080)
        .times(1)
        .returning(|_, p| Ok(p));

    let peers = [pd("127.0.0.1:2379")];
    let inst: TidbInstance<FakeProcess> =
        TidbInstance::new(&ports, &config, &FixedHosts, params(Path::new(""), &peers, false))
            .expect("resolve");

    assert_eq!(inst.spec().port, 4000);
    assert_eq!(inst.spec().status_port, 10080);
    assert_eq!(inst.spec().config_path, None);
    assert_eq!(inst.state(), InstanceState::Resolved);
}

#[test]
fn config_port_becomes_preferred_listening_port() {
    let mut config = MockConfig::new();
    config
        .expect_decode()
        .withf(|path| path == Path::new("/etc/tidb.toml"))
        .times(1)
        .returning(|_| Ok(TidbConfig { port: Some(5000) }));
    let ports = GrantingPorts::default();

    let inst: TidbInstance<FakeProcess> = TidbInstance::new(
        &ports,
        &config,
        &FixedHosts,
        params(Path::new("/etc/tidb.toml"), &[], false),
    )
    .expect("resolve");

    assert_eq!(
        ports.requests(),
        vec![("0.0.0.0".to_string(), 5000), ("0.0.0.0".to_string(), 10080)]
    );
    assert_eq!(inst.spec().port, 5000);
    assert_eq!(inst.spec().config_path, Some(PathBuf::from("/etc/tidb.toml")));
}

#[test]
fn unreadable_config_falls_back_to_default_port() {
    let mut config = MockConfig::new();
    config
        .expect_decode()
        .returning(|_| Err(anyhow::anyhow!("expected `=`, found newline")));
    let ports = GrantingPorts::default();

    let inst: TidbInstance<FakeProcess> = TidbInstance::new(
        &ports,
        &config,
        &FixedHosts,
        params(Path::new("broken.toml"), &[], false),
    )
    .expect("config errors are not fatal");

    assert_eq!(ports.requests()[0], ("0.0.0.0".to_string(), 4000));
    assert_eq!(inst.spec().port, 4000);
    // The flag is still passed so tidb-server reports the problem itself.
    assert!(inst.spec().config_path.is_some());
}

#[test]
fn malformed_config_file_on_disk_behaves_like_no_config() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("tidb.toml");
    std::fs::write(&path, "Port = \"not a number\n").expect("write");
    let ports = GrantingPorts::default();

    let inst: TidbInstance<FakeProcess> = TidbInstance::new(
        &ports,
        &TomlConfigDecoder,
        &FixedHosts,
        params(&path, &[], false),
    )
    .expect("resolve");

    assert_eq!(inst.spec().port, 4000);
}

#[test]
fn substitute_port_from_allocator_is_final() {
    let mut ports = MockPorts::new();
    ports
        .expect_free_port()
        .withf(|_, preferred| *preferred == 4000)
        .returning(|_, _| Ok(4123));
    ports
        .expect_free_port()
        .withf(|_, preferred| *preferred == 10080)
        .returning(|_, _| Ok(10099));

    let inst: TidbInstance<FakeProcess> =
        TidbInstance::new(&ports, &NoConfig, &FixedHosts, params(Path::new(""), &[], false))
            .expect("resolve");

    assert_eq!(inst.spec().port, 4123);
    assert_eq!(inst.spec().status_port, 10099);
    assert_eq!(inst.addr(), "10.0.0.1:4123");
}

#[test]
fn listening_port_exhaustion_aborts_construction() {
    let mut ports = MockPorts::new();
    ports.expect_free_port().times(1).returning(|host, preferred| {
        Err(InstanceError::PortExhausted {
            host: host.to_string(),
            preferred,
        }
        .into())
    });

    let err = TidbInstance::<FakeProcess>::new(
        &ports,
        &NoConfig,
        &FixedHosts,
        params(Path::new(""), &[], false),
    )
    .err()
    .expect("exhausted");

    assert!(matches!(
        instance_error(&err),
        InstanceError::PortExhausted { preferred: 4000, .. }
    ));
}

#[test]
fn status_port_exhaustion_aborts_construction() {
    let mut ports = MockPorts::new();
    ports
        .expect_free_port()
        .withf(|_, preferred| *preferred == 4000)
        .returning(|_, p| Ok(p));
    ports
        .expect_free_port()
        .withf(|_, preferred| *preferred == 10080)
        .returning(|host, preferred| {
            Err(InstanceError::PortExhausted {
                host: host.to_string(),
                preferred,
            }
            .into())
        });

    let err = TidbInstance::<FakeProcess>::new(
        &ports,
        &NoConfig,
        &FixedHosts,
        params(Path::new(""), &[], false),
    )
    .err()
    .expect("exhausted");

    assert!(matches!(
        instance_error(&err),
        InstanceError::PortExhausted { preferred: 10080, .. }
    ));
}

#[test]
fn concurrently_resolved_instances_never_share_a_port() {
    let ports = FreePortAllocator::new();
    let host_params = |dir: &'static str| TidbParams {
        bin_path: Path::new("./tidb-server"),
        dir: Path::new(dir),
        host: "127.0.0.1",
        config_path: Path::new(""),
        id: 0,
        peers: &[],
        enable_binlog: false,
    };

    let (a, b) = std::thread::scope(|s| {
        let a = s.spawn(|| {
            TidbInstance::<FakeProcess>::new(&ports, &NoConfig, &FixedHosts, host_params("/tmp/a"))
                .expect("resolve a")
        });
        let b = s.spawn(|| {
            TidbInstance::<FakeProcess>::new(&ports, &NoConfig, &FixedHosts, host_params("/tmp/b"))
                .expect("resolve b")
        });
        (a.join().expect("join a"), b.join().expect("join b"))
    });

    assert_ne!(a.spec().port, b.spec().port);
    assert_ne!(a.spec().status_port, b.spec().status_port);
}

// ── Accessors ─────────────────────────────────────────────────────────────────

#[test]
fn accessors_report_component_log_file_and_addr() {
    let ports = GrantingPorts::default();
    let inst = build(&ports, params(Path::new(""), &[], false));

    assert_eq!(inst.component(), "tidb");
    assert_eq!(inst.log_file(), PathBuf::from("/tmp/n1/tidb.log"));
    assert_eq!(inst.addr(), "10.0.0.1:4000");
}

#[test]
fn concrete_bind_host_is_advertised_verbatim() {
    let ports = GrantingPorts::default();
    let mut p = params(Path::new(""), &[], false);
    p.host = "192.168.7.3";
    let inst = build(&ports, p);

    assert_eq!(inst.addr(), "192.168.7.3:4000");
    assert_eq!(ports.requests()[0], ("192.168.7.3".to_string(), 4000));
}

// ── Launch command ────────────────────────────────────────────────────────────

#[test]
fn end_to_end_command_matches_expected_flags() {
    let ports = GrantingPorts::default();
    let peers = [pd("127.0.0.1:2379")];
    let inst = build(&ports, params(Path::new(""), &peers, false));

    let command = inst.command(&version());

    assert_eq!(command.component, "tidb");
    assert_eq!(command.bin_path, PathBuf::from("./tidb-server"));
    assert_eq!(command.dir, PathBuf::from("/tmp/n1"));
    assert_eq!(
        command.args,
        vec![
            "-P",
            "4000",
            "--store=tikv",
            "--host=0.0.0.0",
            "--status=10080",
            "--path=127.0.0.1:2379",
            "--log-file=/tmp/n1/tidb.log",
        ]
    );
    assert!(!command.args.iter().any(|a| a.starts_with("--enable-binlog")));
}

#[test]
fn wildcard_peers_are_advertised_in_path() {
    let ports = GrantingPorts::default();
    let peers = [pd("0.0.0.0:2379"), pd("127.0.0.1:2382")];
    let inst = build(&ports, params(Path::new(""), &peers, false));

    assert!(
        inst.command(&version())
            .args
            .contains(&"--path=10.0.0.1:2379,127.0.0.1:2382".to_string())
    );
}

#[test]
fn optional_flags_follow_config_and_binlog() {
    let mut config = MockConfig::new();
    config.expect_decode().returning(|_| Ok(TidbConfig::default()));
    let ports = GrantingPorts::default();

    let inst: TidbInstance<FakeProcess> = TidbInstance::new(
        &ports,
        &config,
        &FixedHosts,
        params(Path::new("/etc/tidb.toml"), &[], true),
    )
    .expect("resolve");

    let args = inst.command(&version()).args;
    assert_eq!(
        &args[args.len() - 2..],
        ["--config=/etc/tidb.toml", "--enable-binlog=true"]
    );
}

// ── Start ─────────────────────────────────────────────────────────────────────

#[test]
fn start_spawns_redirects_output_and_launches() {
    let ports = GrantingPorts::default();
    let peers = [pd("127.0.0.1:2379")];
    let mut inst = build(&ports, params(Path::new(""), &peers, false));
    let spawner = FakeSpawner::default();

    inst.start(&spawner, &CancellationToken::new(), &version())
        .expect("start");

    assert_eq!(inst.state(), InstanceState::Launched);
    assert_eq!(spawner.commands(), vec![inst.command(&version())]);
    let process = inst.process().expect("process attached");
    assert!(process.events.started);
    assert_eq!(
        process.events.output_file,
        Some(PathBuf::from("/tmp/n1/tidb.log"))
    );
    assert_eq!(process.pid(), Some(4242));
}

#[test]
fn redirect_failure_does_not_abort_start() {
    let ports = GrantingPorts::default();
    let mut inst = build(&ports, params(Path::new(""), &[], false));
    let spawner = FakeSpawner::failing_at(FailAt::Redirect);

    inst.start(&spawner, &CancellationToken::new(), &version())
        .expect("start despite redirect failure");

    assert_eq!(inst.state(), InstanceState::Launched);
    let process = inst.process().expect("process attached");
    assert!(process.events.started);
    assert_eq!(process.events.output_file, None);
}

#[test]
fn construction_failure_propagates_and_marks_failed() {
    let ports = GrantingPorts::default();
    let mut inst = build(&ports, params(Path::new(""), &[], false));
    let spawner = FakeSpawner::failing_at(FailAt::Construct);

    let err = inst
        .start(&spawner, &CancellationToken::new(), &version())
        .unwrap_err();

    assert!(matches!(instance_error(&err), InstanceError::BinaryNotFound { .. }));
    assert_eq!(inst.state(), InstanceState::Failed);
    assert!(inst.process().is_none());
}

#[test]
fn start_failure_propagates_and_marks_failed() {
    let ports = GrantingPorts::default();
    let mut inst = build(&ports, params(Path::new(""), &[], false));
    let spawner = FakeSpawner::failing_at(FailAt::Start);

    let err = inst
        .start(&spawner, &CancellationToken::new(), &version())
        .unwrap_err();

    assert!(matches!(instance_error(&err), InstanceError::ProcessStart { .. }));
    assert_eq!(inst.state(), InstanceState::Failed);
    assert!(inst.process().is_none());
}

#[test]
fn cancelled_token_fails_before_anything_is_spawned() {
    let ports = GrantingPorts::default();
    let mut inst = build(&ports, params(Path::new(""), &[], false));
    let spawner = FakeSpawner::default();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = inst.start(&spawner, &cancel, &version()).unwrap_err();

    assert!(matches!(instance_error(&err), InstanceError::Cancelled { .. }));
    assert!(spawner.commands().is_empty());
    assert_eq!(inst.state(), InstanceState::Failed);
}

#[test]
fn second_start_is_rejected() {
    let ports = GrantingPorts::default();
    let mut inst = build(&ports, params(Path::new(""), &[], false));
    let spawner = FakeSpawner::default();
    let cancel = CancellationToken::new();

    inst.start(&spawner, &cancel, &version()).expect("first start");
    let err = inst.start(&spawner, &cancel, &version()).unwrap_err();

    assert!(matches!(instance_error(&err), InstanceError::AlreadyStarted { .. }));
    assert_eq!(spawner.commands().len(), 1);
    assert_eq!(inst.state(), InstanceState::Launched);
}

#[test]
fn failed_instance_cannot_be_restarted() {
    let ports = GrantingPorts::default();
    let mut inst = build(&ports, params(Path::new(""), &[], false));
    let cancel = CancellationToken::new();

    inst.start(&FakeSpawner::failing_at(FailAt::Start), &cancel, &version())
        .expect_err("start fails");
    let err = inst
        .start(&FakeSpawner::default(), &cancel, &version())
        .unwrap_err();

    assert!(matches!(instance_error(&err), InstanceError::InvalidState { .. }));
}

#[tokio::test]
async fn launched_process_can_be_awaited() {
    let ports = GrantingPorts::default();
    let mut inst = build(&ports, params(Path::new(""), &[], false));
    inst.start(&FakeSpawner::default(), &CancellationToken::new(), &version())
        .expect("start");

    let status = inst
        .process_mut()
        .expect("process")
        .wait()
        .await
        .expect("wait");
    assert!(status.success());
}
