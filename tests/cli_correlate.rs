use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!(
        "mesh-trace-{prefix}-{}-{nanos}",
        std::process::id()
    ));
    fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write temp file");
    path
}

const NETWORK: &str = "m3-1xc0ffee";

const LOG: &str = "\
1.0;m3-1;starting experiment
2.0;m3-2;out;0001
2.4;m3-3;out;0001
2.5;m3-1;in;0001;2001:660:3207:4c1:2;6383
4.0;m3-3;  TX succeeded 4 errors 0 retransmissions 2
";

fn write_network(dir: &Path) {
    write_file(
        dir,
        &format!("{NETWORK}.edgelist"),
        "m3-1 m3-2 {'weight': 3.0}\nm3-2 m3-3 {'weight': 4.5}\n",
    );
    write_file(
        dir,
        &format!("{NETWORK}.link_local.csv"),
        "node,iface,lla\nm3-1,7,fe80::1\nm3-2,7,fe80::2\nm3-3,7,fe80::3\n",
    );
}

fn correlate(dir: &Path, args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_correlate"))
        .args(args)
        .env("DATA_PATH", dir)
        .env("GLOBAL_PREFIX", "2001:660:3207:4c1:")
        .env("RUST_LOG", "off")
        .output()
        .expect("run correlate")
}

#[test]
fn correlate_batch_converts_logs_in_data_path() {
    let dir = unique_temp_dir("cli-correlate");
    write_network(&dir);
    let log = write_file(
        &dir,
        &format!("lcn19_n{NETWORK}_c26__mreass_r64Bx10x1000ms_1556530712.log"),
        LOG,
    );

    let output = correlate(&dir, &[]);
    assert!(
        output.status.success(),
        "correlate failed: stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stem = log.to_str().unwrap().strip_suffix("log").unwrap();
    let times = fs::read_to_string(format!("{stem}times.csv")).expect("read times");
    assert_eq!(
        times,
        "mode;data_len;src;dst;hops_to_sink;pkt_id;src_addr;send_time;recv_time;send_errno\n\
         reass;64;m3-2;m3-1;1;1;2001:660:3207:4c1:2;2.0;2.5;0\n\
         reass;64;m3-3;m3-1;2;1;;2.4;;0\n"
    );
    let stats = fs::read_to_string(format!("{stem}stats.csv")).expect("read stats");
    assert!(stats.lines().any(|l| l == "m3-3;2;0;2;;;;"), "stats={stats}");

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn correlate_explicit_log_with_overrides() {
    let dir = unique_temp_dir("cli-correlate-explicit");
    write_network(&dir);
    let log = write_file(&dir, "run.log", LOG);

    let output = correlate(
        &dir,
        &[
            log.to_str().unwrap(),
            "--network",
            NETWORK,
            "--mode",
            "fwd",
            "--data-len",
            "16",
        ],
    );
    assert!(
        output.status.success(),
        "correlate failed: stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );
    let times = fs::read_to_string(dir.join("run.times.csv")).expect("read times");
    assert!(times.lines().nth(1).unwrap().starts_with("fwd;16;m3-2;"));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn correlate_failure_removes_outputs_and_exits_nonzero() {
    let dir = unique_temp_dir("cli-correlate-fail");
    write_network(&dir);
    let log = write_file(
        &dir,
        &format!("lcn19_n{NETWORK}_c26__mfwd_r16Bx10x1000ms_1.log"),
        "1.0;m3-1;starting experiment\n2.5;m3-1;in;0009;2001:660:3207:4c1:3;6383\n",
    );

    let output = correlate(&dir, &[log.to_str().unwrap()]);
    assert!(!output.status.success());
    let stem = log.to_str().unwrap().strip_suffix("log").unwrap();
    assert!(!Path::new(&format!("{stem}times.csv")).exists());
    assert!(!Path::new(&format!("{stem}stats.csv")).exists());

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn correlate_without_name_or_overrides_fails() {
    let dir = unique_temp_dir("cli-correlate-unnamed");
    write_network(&dir);
    let log = write_file(&dir, "run.log", LOG);

    let output = correlate(&dir, &[log.to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(!dir.join("run.times.csv").exists());

    let _ = fs::remove_dir_all(&dir);
}
