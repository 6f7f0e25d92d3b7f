/// Current UTC timestamp in milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Generate a Snowflake-style i64 for use as resource ID.
///
/// Layout (53 bits, fits in JavaScript's Number.MAX_SAFE_INTEGER):
///   - 41 bits: milliseconds since 2024-01-01 UTC (~69 years)
///   - 12 bits: random (4096 values per ms, collision-free at branch scale)
pub fn snowflake_id() -> i64 {
    use rand::Rng;
    // Custom epoch: 2024-01-01 00:00:00 UTC
    const EPOCH_MS: i64 = 1_704_067_200_000;
    let now = now_millis();
    let ts = (now - EPOCH_MS) & 0x1FF_FFFF_FFFF; // 41 bits
    let rand_bits: i64 = rand::thread_rng().gen_range(0..0x1000); // 12 bits
    (ts << 12) | rand_bits
}

/// Generate a human-readable order code: `ORD-<millis>-<4 digits>`
pub fn order_code() -> String {
    use rand::Rng;
    let suffix: u16 = rand::thread_rng().gen_range(0..10_000);
    format!("ORD-{}-{:04}", now_millis(), suffix)
}

/// Generate a sale code: `SALE-<millis>-<4 digits>`
pub fn sale_code() -> String {
    use rand::Rng;
    let suffix: u16 = rand::thread_rng().gen_range(0..10_000);
    format!("SALE-{}-{:04}", now_millis(), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snowflake_ids_are_positive_and_distinct() {
        let a = snowflake_id();
        let b = snowflake_id();
        assert!(a > 0);
        assert!(b > 0);
        // Same millisecond collisions are possible but vanishingly rare with
        // 12 random bits; distinct timestamps guarantee distinct IDs.
        assert!(a != b || (a >> 12) == (b >> 12));
    }

    #[test]
    fn code_shapes() {
        let oc = order_code();
        assert!(oc.starts_with("ORD-"));
        assert_eq!(oc.split('-').count(), 3);

        let sc = sale_code();
        assert!(sc.starts_with("SALE-"));
        assert_eq!(sc.split('-').count(), 3);
        let suffix = sc.rsplit('-').next().unwrap();
        assert_eq!(suffix.len(), 4);
    }
}
