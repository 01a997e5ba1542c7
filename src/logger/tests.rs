use {
    crate::logger::format_line,
    log::Level,
    std::time::{Duration, SystemTime},
};

#[test]
fn line_format() {
    let time = SystemTime::UNIX_EPOCH + Duration::from_millis(1_700_000_000_123);
    let line = format_line(
        time,
        Level::Warn,
        Some("jay_xcon::xcon"),
        &format_args!("unexpected {}", 1),
    );
    assert_eq!(
        String::from_utf8(line).unwrap(),
        "[2023-11-14T22:13:20.123Z WARN  jay_xcon::xcon] unexpected 1\n",
    );
    let line = format_line(time, Level::Info, None, &format_args!("x"));
    assert_eq!(
        String::from_utf8(line).unwrap(),
        "[2023-11-14T22:13:20.123Z INFO ] x\n",
    );
}
