use std::sync::Arc;
use std::time::Duration;

use super::*;

#[test]
fn entries_come_out_in_fifo_order() {
    let q = JobQueue::new();
    for i in 0..5 {
        q.push(Entry::Job(i));
    }
    q.push(Entry::Stop);
    let mut seen = Vec::new();
    loop {
        match q.pop_blocking() {
            Entry::Job(i) => seen.push(i),
            Entry::Stop => break,
        }
        q.task_done();
    }
    assert_eq!(seen, vec![0, 1, 2, 3, 4]);
    assert!(q.is_empty());
    assert_eq!(q.unfinished(), 1);
    q.task_done();
    assert_eq!(q.unfinished(), 0);
}

#[test]
fn pop_blocks_until_something_is_pushed() {
    let q = Arc::new(JobQueue::<u32>::new());
    let consumer = {
        let q = Arc::clone(&q);
        std::thread::spawn(move || match q.pop_blocking() {
            Entry::Job(v) => v,
            Entry::Stop => 0,
        })
    };
    std::thread::sleep(Duration::from_millis(20));
    q.push(Entry::Job(7));
    assert_eq!(consumer.join().unwrap(), 7);
}

#[test]
fn join_waits_for_every_acknowledgement() {
    let q = Arc::new(JobQueue::<u32>::new());
    for i in 0..3 {
        q.push(Entry::Job(i));
    }
    let worker = {
        let q = Arc::clone(&q);
        std::thread::spawn(move || {
            for _ in 0..3 {
                let _ = q.pop_blocking();
                std::thread::sleep(Duration::from_millis(5));
                q.task_done();
            }
        })
    };
    q.join();
    assert_eq!(q.unfinished(), 0);
    worker.join().unwrap();

    // an idle queue joins immediately
    JobQueue::<u32>::new().join();
}
