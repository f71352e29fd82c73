mod common;

use common::{host, HOST_ADDRESS};
use elvis_transport::{
    init_events, protocols::Udp, DescriptorKind, Handle, LoggingError, Transport,
};
use std::fs;

#[test]
fn events_go_to_the_log_file() -> anyhow::Result<()> {
    let directory = std::env::temp_dir().join(format!("elvis-transport-{}", std::process::id()));
    let path = init_events(&directory)?;
    assert!(path.starts_with(&directory));

    let (host, _, _) = host();
    let mut transport = Transport::new(
        Box::new(Udp::new()),
        DescriptorKind::UdpSocket,
        Handle::new(12),
        host,
    );
    transport.bind(HOST_ADDRESS, 4242);

    let contents = fs::read_to_string(&path)?;
    assert!(contents.contains("transport bound"));
    assert!(contents.contains("10.0.0.2:4242"));

    assert!(matches!(
        init_events(&directory),
        Err(LoggingError::AlreadyInstalled)
    ));

    fs::remove_dir_all(&directory)?;
    Ok(())
}
