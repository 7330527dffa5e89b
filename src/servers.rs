//! WHOIS server selection.
//!
//! A static TLD-to-server table plus a small fixed set of compound
//! second-level suffixes, with `whois.iana.org` as the last-resort server
//! (IANA answers with a referral for most TLDs it still knows better than we
//! do). The table is built once at startup, optionally merged with an
//! overrides file, and never mutated afterwards.

use std::collections::HashMap;
use std::net::IpAddr;

/// Registry used for all IP address queries.
pub const IP_REGISTRY_SERVER: &str = "whois.arin.net";

/// Last-resort server when no TLD mapping exists.
pub const DEFAULT_SERVER: &str = "whois.iana.org";

/// Compound second-level public suffixes with dedicated routing.
const COMPOUND_SUFFIXES: &[(&str, &str)] = &[
    ("co.uk", "whois.nic.uk"),
    ("org.uk", "whois.nic.uk"),
    ("ac.uk", "whois.nic.uk"),
    ("gov.uk", "whois.nic.uk"),
    ("net.uk", "whois.nic.uk"),
    ("me.uk", "whois.nic.uk"),
];

/// Built-in TLD mappings. Not exhaustive; anything missing falls back to
/// [`DEFAULT_SERVER`].
const BUILTIN_SERVERS: &[(&str, &str)] = &[
    // Generic TLDs
    ("com", "whois.verisign-grs.com"),
    ("net", "whois.verisign-grs.com"),
    ("org", "whois.pir.org"),
    ("info", "whois.afilias.net"),
    ("biz", "whois.biz"),
    ("name", "whois.nic.name"),
    ("mobi", "whois.afilias.net"),
    ("pro", "whois.registrypro.pro"),
    ("aero", "whois.aero"),
    ("asia", "whois.nic.asia"),
    ("cat", "whois.nic.cat"),
    ("coop", "whois.nic.coop"),
    ("edu", "whois.educause.edu"),
    ("gov", "whois.dotgov.gov"),
    ("int", "whois.iana.org"),
    ("jobs", "whois.nic.jobs"),
    ("museum", "whois.museum"),
    ("tel", "whois.nic.tel"),
    ("travel", "whois.nic.travel"),
    // Newer generic TLDs
    ("app", "whois.nic.google"),
    ("dev", "whois.nic.google"),
    ("page", "whois.nic.google"),
    ("blog", "whois.nic.blog"),
    ("cloud", "whois.nic.cloud"),
    ("online", "whois.nic.online"),
    ("site", "whois.nic.site"),
    ("tech", "whois.nic.tech"),
    ("store", "whois.nic.store"),
    ("shop", "whois.nic.shop"),
    ("xyz", "whois.nic.xyz"),
    ("email", "whois.nic.email"),
    ("news", "whois.nic.news"),
    ("live", "whois.nic.live"),
    ("one", "whois.nic.one"),
    // Repurposed country codes
    ("io", "whois.nic.io"),
    ("co", "whois.nic.co"),
    ("me", "whois.nic.me"),
    ("tv", "whois.nic.tv"),
    ("cc", "ccwhois.verisign-grs.com"),
    ("ai", "whois.nic.ai"),
    ("gg", "whois.gg"),
    ("sh", "whois.nic.sh"),
    ("im", "whois.nic.im"),
    ("je", "whois.je"),
    ("li", "whois.nic.li"),
    ("fm", "whois.nic.fm"),
    ("la", "whois.nic.la"),
    ("to", "whois.tonic.to"),
    ("ws", "whois.website.ws"),
    // Country code TLDs
    ("uk", "whois.nic.uk"),
    ("de", "whois.denic.de"),
    ("fr", "whois.nic.fr"),
    ("nl", "whois.domain-registry.nl"),
    ("eu", "whois.eu"),
    ("jp", "whois.jprs.jp"),
    ("au", "whois.auda.org.au"),
    ("us", "whois.nic.us"),
    ("ca", "whois.cira.ca"),
    ("ch", "whois.nic.ch"),
    ("se", "whois.iis.se"),
    ("no", "whois.norid.no"),
    ("fi", "whois.fi"),
    ("dk", "whois.dk-hostmaster.dk"),
    ("it", "whois.nic.it"),
    ("es", "whois.nic.es"),
    ("pt", "whois.dns.pt"),
    ("pl", "whois.dns.pl"),
    ("cz", "whois.nic.cz"),
    ("at", "whois.nic.at"),
    ("be", "whois.dns.be"),
    ("ie", "whois.iedr.ie"),
    ("ru", "whois.tcinet.ru"),
    ("cn", "whois.cnnic.cn"),
    ("in", "whois.registry.in"),
    ("br", "whois.registro.br"),
    ("mx", "whois.mx"),
    ("kr", "whois.kr"),
    ("tw", "whois.twnic.net.tw"),
    ("hk", "whois.hkirc.hk"),
    ("sg", "whois.sgnic.sg"),
    ("nz", "whois.srs.net.nz"),
    ("za", "whois.registry.net.za"),
    ("tr", "whois.trabis.gov.tr"),
    ("gr", "whois.nic.gr"),
    ("il", "whois.isoc.org.il"),
    ("ar", "whois.nic.ar"),
    ("cl", "whois.nic.cl"),
    ("id", "whois.id"),
    ("th", "whois.thnic.co.th"),
    ("vn", "whois.nic.vn"),
    ("my", "whois.mynic.my"),
    ("ro", "whois.rotld.ro"),
    ("hu", "whois.nic.hu"),
    ("sk", "whois.sk-nic.sk"),
    ("ua", "whois.ua"),
    ("lt", "whois.domreg.lt"),
    ("lv", "whois.nic.lv"),
    ("ee", "whois.tld.ee"),
    ("is", "whois.isnic.is"),
    ("lu", "whois.dns.lu"),
];

/// Immutable TLD routing table, fixed for the process lifetime.
#[derive(Debug, Clone)]
pub struct ServerTable {
    tld: HashMap<String, String>,
    default_server: String,
}

impl Default for ServerTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ServerTable {
    /// Table with only the built-in mappings.
    pub fn builtin() -> Self {
        let tld = BUILTIN_SERVERS
            .iter()
            .map(|(t, s)| ((*t).to_string(), (*s).to_string()))
            .collect();
        ServerTable {
            tld,
            default_server: DEFAULT_SERVER.to_string(),
        }
    }

    /// Built-in mappings merged with per-TLD overrides (overrides win).
    /// Keys are normalized to lowercase without a leading dot.
    pub fn with_overrides(overrides: HashMap<String, String>) -> Self {
        let mut table = Self::builtin();
        for (tld, server) in overrides {
            let key = tld.trim().trim_start_matches('.').to_ascii_lowercase();
            if !key.is_empty() && !server.trim().is_empty() {
                table.tld.insert(key, server.trim().to_string());
            }
        }
        table
    }

    /// Number of TLD mappings known.
    pub fn len(&self) -> usize {
        self.tld.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tld.is_empty()
    }

    /// Direct TLD lookup (no normalization).
    pub fn tld_server(&self, tld: &str) -> Option<&str> {
        self.tld.get(tld).map(String::as_str)
    }

    pub fn default_server(&self) -> &str {
        &self.default_server
    }

    /// Map a query to the WHOIS server to ask first.
    ///
    /// The query is normalized (scheme and path stripped, lowercased) before
    /// routing, so this accepts rawer input than the validator does. Pure;
    /// performs no I/O.
    pub fn resolve(&self, query: &str) -> String {
        let host = normalize_target(query);

        if host.parse::<IpAddr>().is_ok() {
            return IP_REGISTRY_SERVER.to_string();
        }

        let labels: Vec<&str> = host.split('.').collect();
        if labels.len() < 2 {
            return self.default_server.clone();
        }

        let tld = labels[labels.len() - 1];
        let suffix = format!("{}.{}", labels[labels.len() - 2], tld);
        for (compound, server) in COMPOUND_SUFFIXES {
            if suffix == *compound {
                return (*server).to_string();
            }
        }

        match self.tld.get(tld) {
            Some(server) => server.clone(),
            None => self.default_server.clone(),
        }
    }
}

/// Normalize a lookup target: trim, drop an `http://`/`https://` scheme
/// prefix, cut everything after the first `/`, lowercase, drop trailing dots.
pub fn normalize_target(raw: &str) -> String {
    let mut s = raw.trim();
    let lower = s.to_ascii_lowercase();
    if lower.starts_with("http://") {
        s = &s["http://".len()..];
    } else if lower.starts_with("https://") {
        s = &s["https://".len()..];
    }
    let s = match s.find('/') {
        Some(idx) => &s[..idx],
        None => s,
    };
    s.trim().trim_end_matches('.').to_ascii_lowercase()
}
