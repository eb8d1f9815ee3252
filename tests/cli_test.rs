use assert_cmd::prelude::*; // Add methods on commands
use predicates::prelude::*;
use std::path::PathBuf;
use std::process::Command; // Run programs
use tempfile;
type STDRESULT = Result<(),Box<dyn std::error::Error>>;

const SAMPLE: &str = "HAMLET: Who's there?\r\nFRANCISCO: Nay, answer me: stand, and unfold yourself.\r\n\
HAMLET: Long live the king!\r\nFRANCISCO: Bernardo?\r\nHAMLET: He.\r\n\
FRANCISCO: You come most carefully upon your hour.\r\n";

// Put the sample in the temporary directory and return its path.
fn write_sample(temp_dir: &tempfile::TempDir,dat: &[u8]) -> Result<PathBuf,Box<dyn std::error::Error>> {
    let path = temp_dir.path().join("sample.txt");
    std::fs::write(&path,dat)?;
    Ok(path)
}

fn round_trip_test(dat: &[u8],method: &str) -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let in_path = write_sample(&temp_dir,dat)?;
    let cmp_path = temp_dir.path().join("sample.huf");
    let out_path = temp_dir.path().join("expanded.txt");
    let table_path = temp_dir.path().join("sample.code");
    let mut cmd = Command::cargo_bin("huffcode")?;
    cmd.arg("compress")
        .arg("-m").arg(method)
        .arg("-i").arg(&in_path)
        .arg("-o").arg(&cmp_path);
    if method=="table" {
        cmd.arg("-t").arg(&table_path);
    }
    cmd.assert()
        .success()
        .stderr(predicate::str::contains(format!("compressed {} into",dat.len())));
    let mut cmd = Command::cargo_bin("huffcode")?;
    cmd.arg("expand")
        .arg("-m").arg(method)
        .arg("-i").arg(&cmp_path)
        .arg("-o").arg(&out_path);
    if method=="table" {
        cmd.arg("-t").arg(&table_path);
    }
    cmd.assert()
        .success()
        .stderr(predicate::str::contains(format!("into {}",dat.len())));
    match (std::fs::read(in_path),std::fs::read(out_path)) {
        (Ok(v1),Ok(v2)) => {
            assert_eq!(v1,v2);
        },
        _ => panic!("unable to compare output with reference")
    }
    Ok(())
}

#[test]
fn header_round_trip() -> STDRESULT {
    round_trip_test(SAMPLE.as_bytes(),"header")?;
    round_trip_test(&[],"header")
}

#[test]
fn table_round_trip() -> STDRESULT {
    round_trip_test(SAMPLE.as_bytes(),"table")?;
    round_trip_test(&[],"table")
}

#[test]
fn table_only() -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let in_path = write_sample(&temp_dir,"AAAAA".as_bytes())?;
    let table_path = temp_dir.path().join("sample.code");
    Command::cargo_bin("huffcode")?
        .arg("table")
        .arg("-i").arg(&in_path)
        .arg("-o").arg(&table_path)
        .assert()
        .success();
    assert_eq!(std::fs::read_to_string(table_path)?,"256\n0\n65\n1\n");
    Ok(())
}

#[test]
fn table_method_needs_table() -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let in_path = write_sample(&temp_dir,SAMPLE.as_bytes())?;
    Command::cargo_bin("huffcode")?
        .arg("compress")
        .arg("-m").arg("table")
        .arg("-i").arg(&in_path)
        .arg("-o").arg(temp_dir.path().join("sample.huf"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("needs --table"));
    Ok(())
}

#[test]
fn garbage_fails() -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    // all zero bits never finish a header
    let in_path = write_sample(&temp_dir,&[0;64])?;
    Command::cargo_bin("huffcode")?
        .arg("expand")
        .arg("-m").arg("header")
        .arg("-i").arg(&in_path)
        .arg("-o").arg(temp_dir.path().join("expanded.txt"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("MalformedHeader"));
    Ok(())
}

#[test]
fn keep_existing_table() -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let in_path = write_sample(&temp_dir,SAMPLE.as_bytes())?;
    let cmp_path = temp_dir.path().join("sample.huf");
    let table_path = temp_dir.path().join("sample.code");
    std::fs::write(&table_path,"256\n\n")?;
    assert_cmd::Command::cargo_bin("huffcode")?
        .arg("compress")
        .arg("-m").arg("table")
        .arg("-i").arg(&in_path)
        .arg("-o").arg(&cmp_path)
        .arg("-t").arg(&table_path)
        .write_stdin("n\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("abort operation"));
    assert!(!cmp_path.exists());
    assert_eq!(std::fs::read_to_string(&table_path)?,"256\n\n");
    Ok(())
}
