//! Compiled regular expressions used by the paystub extractor.
//!
//! Patterns compile lazily on first use. A pattern that fails to compile
//! yields `None` and the code using it treats the document as if nothing
//! matched, so extraction never fails.

use regex::Regex;
use std::sync::LazyLock;

macro_rules! pattern {
    ($name:ident, $regex_str:expr) => {
        pub static $name: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new($regex_str).ok());
    };
}

// ── Amounts ────────────────────────────────────────────────────────────────
// Optional sign, optional `$`, thousands separators, exactly two decimals.
// The leading class keeps tokens like `A12.50` or `1.234.56` out.
pattern!(
    RE_AMOUNT,
    r"(?:^|[^\w.,/])(?P<sign>-)?\$?(?P<int>\d{1,3}(?:,\d{3})+|\d+)\.(?P<frac>\d{2})\b"
);

// ── Column header markers ──────────────────────────────────────────────────
pattern!(RE_MARKER_RATE, r"(?i)\brate\b");
pattern!(RE_MARKER_HOURS, r"(?i)\b(?:hours|hrs)\b");
pattern!(RE_MARKER_THIS_PERIOD, r"(?i)\bthis\s+period\b|\bcurrent\b");
pattern!(RE_MARKER_YTD, r"(?i)\byear\s+to\s+date\b|\bytd\b");

// ── Field labels ───────────────────────────────────────────────────────────
pattern!(RE_GROSS_PAY, r"(?i)\bgross\s+(?:pay|earnings)\b|\btotal\s+gross\b");
pattern!(RE_NET_PAY, r"(?i)\bnet\s+pay\b");
pattern!(
    RE_FEDERAL,
    r"(?i)\bfederal\s+(?:income|tax|withholding)\b|\bfed(?:eral)?\s+w/h\b|\bfed\s+(?:income\s+)?tax\b"
);
pattern!(RE_STATE, r"(?i)\bstate\s+(?:income|tax|withholding)\b");
pattern!(
    RE_LOCAL,
    r"(?i)\blocal\s+(?:income\s+)?tax\b|\blocal\s+income\b|\bcity\s+(?:income\s+)?tax\b"
);
pattern!(RE_SOCIAL_SECURITY, r"(?i)\bsocial\s+security\b|\boasdi\b|\bsoc\s+sec\b");
pattern!(RE_MEDICARE, r"(?i)\bmedicare\b");

pattern!(RE_EXCLUDE_TAXABLE, r"(?i)\btaxable\b");
pattern!(
    RE_EXCLUDE_STATE,
    r"(?i)\b(?:unemployment|sui|sdi|disability|taxable)\b"
);
pattern!(RE_EXCLUDE_MEDICARE, r"(?i)\b(?:additional|taxable|wages)\b");
pattern!(RE_EXCLUDE_WAGES, r"(?i)\b(?:taxable|wages)\b");

pattern!(RE_STATE_INCOME, r"(?i)\bstate\s+income\b");

// ── Dates ──────────────────────────────────────────────────────────────────
pattern!(
    RE_PERIOD_START,
    r"(?i)period\s*(?:start(?:ing)?|begin(?:ning)?)(?:\s+date)?[:\s]*(\d{4}-\d{1,2}-\d{1,2}|\d{1,2}[/-]\d{1,2}[/-]\d{2,4})"
);
pattern!(
    RE_PERIOD_END,
    r"(?i)period\s*end(?:ing)?(?:\s+date)?[:\s]*(\d{4}-\d{1,2}-\d{1,2}|\d{1,2}[/-]\d{1,2}[/-]\d{2,4})"
);
pattern!(
    RE_PERIOD_RANGE,
    r"(?i)pay\s*period[:\s]*(\d{4}-\d{1,2}-\d{1,2}|\d{1,2}[/-]\d{1,2}[/-]\d{2,4})\s*(?:-|–|to|through|thru)\s*(\d{4}-\d{1,2}-\d{1,2}|\d{1,2}[/-]\d{1,2}[/-]\d{2,4})"
);

/// Returns true if the pattern compiled and matches `text`.
pub fn is_match(regex: &LazyLock<Option<Regex>>, text: &str) -> bool {
    regex.as_ref().is_some_and(|re| re.is_match(text))
}

/// Returns the byte offset of the first match, if any.
pub fn find_offset(regex: &LazyLock<Option<Regex>>, text: &str) -> Option<usize> {
    regex.as_ref()?.find(text).map(|m| m.start())
}
