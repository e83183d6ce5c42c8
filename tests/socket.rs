use std::thread;

use netbind::{Family, SockAddr, SockType, Socket};

#[test]
fn stream_client_and_server_talk() {
    let _ = env_logger::try_init();

    let mut server = Socket::new(Family::V4, SockType::Stream).unwrap();
    server.set_reuseaddr(true).unwrap();
    server.bind(&SockAddr::v4("127.0.0.1", 0)).unwrap();
    server.listen(1).unwrap();
    let addr = server.local_addr().unwrap();

    let client = thread::spawn(move || {
        let mut sock = Socket::new(Family::V4, SockType::Stream).unwrap();
        sock.connect(&addr).unwrap();
        sock.send(b"marco").unwrap();
        let reply = sock.recv(32).unwrap();
        sock.close();
        reply
    });

    let (mut conn, peer) = server.accept().unwrap();
    assert_eq!(peer.family(), Family::V4);
    assert_eq!(conn.recv(32).unwrap(), b"marco");
    conn.send(b"polo").unwrap();

    assert_eq!(client.join().unwrap(), b"polo");

    // The client closed; the server side reads end-of-stream as empty.
    assert_eq!(conn.recv(32).unwrap(), b"");
}

#[test]
fn resolved_record_feeds_connect() {
    use netbind::dns::RawRecord;

    let mut server = Socket::new(Family::V4, SockType::Stream).unwrap();
    server.bind(&SockAddr::v4("127.0.0.1", 0)).unwrap();
    server.listen(1).unwrap();
    let port = server.local_addr().unwrap().port();

    let resolver = netbind::Resolver::builder()
        .dns_backend(netbind::dns::StaticResolver::new())
        .resolve("loop.test", RawRecord::new([127, 0, 0, 1]))
        .build()
        .unwrap();

    let infos = resolver.resolve("loop.test", port, Family::V4).unwrap();
    let client = thread::spawn(move || {
        let mut sock = Socket::new(Family::V4, SockType::Stream).unwrap();
        sock.connect(&infos[0].addr).unwrap();
        sock.send(b"via dns").unwrap();
    });

    let (mut conn, _) = server.accept().unwrap();
    assert_eq!(conn.recv(32).unwrap(), b"via dns");
    client.join().unwrap();
}
