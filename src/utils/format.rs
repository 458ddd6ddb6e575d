//! Human-readable balance formatting

/// Satoshis per bitcoin
pub const SATS_PER_BTC: u64 = 100_000_000;

/// Format a satoshi amount the way the wallet summary shows it:
/// whole BTC amounts as BTC, mid-size amounts as mBTC, dust as sats.
pub fn format_balance(sats: u64) -> String {
    if sats == 0 {
        return "0 BTC".to_string();
    }

    if sats >= SATS_PER_BTC {
        let whole = sats / SATS_PER_BTC;
        let frac = format!("{:08}", sats % SATS_PER_BTC);
        return format!("{} BTC", join_trimmed(&whole.to_string(), &frac));
    }

    // 0.001 BTC
    if sats >= SATS_PER_BTC / 1000 {
        // 1 mBTC = 100_000 sats, shown with 5 decimals
        let whole = sats / 100_000;
        let frac = format!("{:05}", sats % 100_000);
        return format!("{} mBTC", join_trimmed(&whole.to_string(), &frac));
    }

    format!("{} sats", group_thousands(sats))
}

fn join_trimmed(whole: &str, frac: &str) -> String {
    let frac = frac.trim_end_matches('0');
    if frac.is_empty() {
        whole.to_string()
    } else {
        format!("{}.{}", whole, frac)
    }
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
