//! Spinner board driven from plain threads: progress updates, status text
//! and buffered log lines.

use std::time::Duration;

use taskboard::prelude::*;

fn main() {
    let mut board = TaskBoard::new();
    board.start();

    let compile = board.log_progress("compile", 40.0, 0.0);
    let docker = board.log_task(TaskOptions::new("docker build").status("pulling base image"));

    let t1 = std::thread::spawn(move || {
        for unit in 1..=40 {
            sleep(60);
            compile.update(Update::progress(unit as f64)).unwrap();
        }
    });

    let t2 = std::thread::spawn(move || {
        for step in ["layer 1/3: deps", "layer 2/3: build", "layer 3/3: assets"] {
            sleep(700);
            docker.set_status(step);
        }
        docker.fulfill();
    });

    board.log("starting build pipeline");
    sleep(1200);
    board.error("warning: lockfile older than manifest");

    t1.join().unwrap();
    t2.join().unwrap();
    board.stop();
}

fn sleep(ms: u64) {
    std::thread::sleep(Duration::from_millis(ms));
}
