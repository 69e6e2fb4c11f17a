use arith::thread_pool::{RayonThreadPool, SharedQueueThreadPool, ThreadPool};
use arith::{logging, ArithClient, ArithError, ArithServer, ClientConfig, ServerConfig};
use crossbeam_utils::thread;
use std::io::{Cursor, Write};
use std::net::{SocketAddr, TcpListener};
use std::time::Duration;
use zip::write::FileOptions;
use zip::ZipWriter;

fn test_config(addr: SocketAddr) -> ServerConfig {
    ServerConfig {
        addr,
        messages_per_child: 4,
        ..ServerConfig::default()
    }
}

fn start_server<P: ThreadPool + Send + 'static>() -> SocketAddr {
    let logger = logging::discard();
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let config = test_config(addr);
    let pool = P::new(4, &logger).unwrap();

    std::thread::spawn(move || ArithServer::new(config, pool, &logger).serve(listener));
    addr
}

fn request(addr: SocketAddr, payload: &[u8]) -> Vec<String> {
    let client = ArithClient::connect(addr, &ClientConfig::default(), &logging::discard()).unwrap();
    let response = String::from_utf8(client.request(payload).unwrap()).unwrap();
    let mut lines: Vec<String> = response.split('\n').map(str::to_owned).collect();
    lines.sort();
    lines
}

#[test]
fn evaluates_a_text_batch() {
    let addr = start_server::<SharedQueueThreadPool>();
    let lines = request(addr, b"3 + 4\n\n3 * 4 * 2\n-- 2\n");

    assert_eq!(
        lines,
        vec![
            "process[0] response, input_line[0]: 3 + 4 = 7.0 ",
            "process[0] response, input_line[1]: 3 * 4 * 2 = 24.0 ",
            "process[0] response, input_line[2]: -- 2 = \
             two consecutive operators found, wrong syntax ",
        ]
    );
}

#[test]
fn evaluates_a_zip_batch() {
    let addr = start_server::<RayonThreadPool>();

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    zip.start_file("operations.txt", FileOptions::<'_, ()>::default()).unwrap();
    zip.write_all(b"12 / 5 * 2\n2 * 5 + 20 - 3 * 2\n").unwrap();
    let archive = zip.finish().unwrap().into_inner();

    let lines = request(addr, &archive);
    assert_eq!(
        lines,
        vec![
            "process[0] response, input_line[0]: 12 / 5 * 2 = 4.8 ",
            "process[0] response, input_line[1]: 2 * 5 + 20 - 3 * 2 = 24.0 ",
        ]
    );
}

#[test]
fn large_batches_spread_over_workers() {
    let addr = start_server::<SharedQueueThreadPool>();
    let payload: String = (0..40).map(|i| format!("{} * 2\n", i)).collect();

    let workers = test_config(addr).worker_count(40) as usize;

    let lines = request(addr, payload.as_bytes());
    assert_eq!(lines.len(), 40);
    for seq in 0..40 {
        let worker = seq % workers;
        let line = format!(
            "process[{}] response, input_line[{}]: {} * 2 = {:?} ",
            worker,
            seq,
            seq,
            (seq * 2) as f64
        );
        assert!(lines.contains(&line), "missing {:?}", line);
    }
}

#[test]
fn serves_concurrent_clients() {
    let addr = start_server::<SharedQueueThreadPool>();

    thread::scope(|s| {
        for i in 0..8 {
            s.spawn(move |_| {
                let payload = format!("{} + 1\n{} * 3\n", i, i);
                let lines = request(addr, payload.as_bytes());
                assert_eq!(lines.len(), 2);
                assert!(lines[0].ends_with(&format!("= {:?} ", (i + 1) as f64)));
                assert!(lines[1].ends_with(&format!("= {:?} ", (i * 3) as f64)));
            });
        }
    })
    .unwrap();
}

#[test]
fn connect_gives_up_after_configured_attempts() {
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let config = ClientConfig {
        attempts: 2,
        retry_step: Duration::from_millis(10),
        ..ClientConfig::default()
    };

    match ArithClient::connect(addr, &config, &logging::discard()) {
        Err(ArithError::Io(_)) => {}
        Err(e) => panic!("unexpected error {}", e),
        Ok(_) => panic!("connection should fail"),
    }
}
