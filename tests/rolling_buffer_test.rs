use barforge::domain::errors::BufferError;
use barforge::domain::market::bar::Bar;
use barforge::domain::market::interval::Interval;
use barforge::domain::market::rolling_buffer::RollingBuffer;
use barforge::domain::market::symbol::Exchange;
use chrono::NaiveDate;
use rust_decimal::Decimal;

fn bar(n: i64) -> Bar {
    let start = NaiveDate::from_ymd_opt(2021, 3, 1)
        .unwrap()
        .and_hms_opt(9, 0, 0)
        .unwrap();
    let mut bar = Bar::seeded(
        "600036",
        Exchange::Sse,
        start + chrono::Duration::minutes(n),
        Interval::Minute,
        Decimal::from(n),
    );
    bar.volume = Decimal::from(n * 10);
    bar
}

#[test]
fn test_zero_capacity_rejected() {
    assert_eq!(
        RollingBuffer::new(0).unwrap_err(),
        BufferError::ZeroCapacity { capacity: 0 }
    );
}

#[test]
fn test_capacity_three_lifecycle() {
    let mut buffer = RollingBuffer::new(3).unwrap();

    buffer.update(&bar(1));
    buffer.update(&bar(2));
    assert!(!buffer.inited());
    // unwritten slots read as zero
    assert_eq!(buffer.close(), &[0.0, 1.0, 2.0]);

    buffer.update(&bar(3));
    assert!(buffer.inited());

    buffer.update(&bar(4));
    assert!(buffer.inited());
    assert_eq!(buffer.close()[0], 2.0);
    assert_eq!(buffer.close(), &[2.0, 3.0, 4.0]);
    assert_eq!(buffer.volume(), &[20.0, 30.0, 40.0]);
    assert_eq!(buffer.count(), 4);

    for n in 5..20 {
        buffer.update(&bar(n));
        assert!(buffer.inited());
        assert_eq!(buffer.close().len(), 3);
    }
}
