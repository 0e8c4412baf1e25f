use std::collections::HashSet;

/// Markers that identify a hosts-format file rather than a bare domain list.
const HOSTS_MARKERS: [&str; 4] = ["localhost ", "127.0.0.1 ", "::1 ", "0.0.0.0 "];

pub fn is_hosts_format(data: &str) -> bool {
    HOSTS_MARKERS.iter().any(|marker| data.contains(marker))
}

/// Converts a downloaded list or hosts file into a vector of domains.
///
/// Lines ending with a suppressed TLD are dropped before any other handling,
/// as are comments, whitelisted domains and the `localhost` hosts entry.
pub fn parse_domains(
    data: &str,
    whitelist: &HashSet<String>,
    tld_suppressions: &[String],
) -> Vec<String> {
    let hosts_format = is_hosts_format(data);
    let mut domains = Vec::new();

    for line in data.lines() {
        if line.starts_with('#') || line.starts_with(';') || line.trim().is_empty() {
            continue;
        }

        if !tld_suppressions.is_empty()
            && tld_suppressions.iter().any(|tld| line.ends_with(tld.as_str()))
        {
            continue;
        }

        let domain = if hosts_format {
            // Second whitespace field is the hostname; lines without one are noise
            let mut parts = line.split_whitespace();
            let _ip = parts.next();
            match parts.next() {
                Some(host) if host != "localhost" => host,
                _ => continue,
            }
        } else {
            line.trim_end()
        };

        if whitelist.contains(domain) {
            continue;
        }

        domains.push(domain.to_string());
    }

    domains
}

/// Splits domains into chunks sized for Gateway list creation.
pub fn chunk_domains(domains: &[String], chunk_size: usize) -> Vec<Vec<String>> {
    domains
        .chunks(chunk_size)
        .map(|chunk| chunk.to_vec())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_filters() -> (HashSet<String>, Vec<String>) {
        (HashSet::new(), Vec::new())
    }

    #[test]
    fn test_detects_hosts_format() {
        assert!(is_hosts_format("0.0.0.0 ads.example.com\n"));
        assert!(is_hosts_format("127.0.0.1 tracker.example.net\n"));
        assert!(!is_hosts_format("ads.example.com\ntracker.example.net\n"));
    }

    #[test]
    fn test_parses_plain_domain_list() {
        let (whitelist, tlds) = no_filters();
        let data = "ads.example.com\n# a comment\n; another comment\n\ntracker.example.net\n";

        let domains = parse_domains(data, &whitelist, &tlds);

        assert_eq!(domains, vec!["ads.example.com", "tracker.example.net"]);
    }

    #[test]
    fn test_parses_hosts_file_and_skips_localhost() {
        let (whitelist, tlds) = no_filters();
        let data = "127.0.0.1 localhost\n0.0.0.0 ads.example.com\n0.0.0.0 tracker.example.net\n";

        let domains = parse_domains(data, &whitelist, &tlds);

        assert_eq!(domains, vec!["ads.example.com", "tracker.example.net"]);
    }

    #[test]
    fn test_hosts_line_without_hostname_is_dropped() {
        let (whitelist, tlds) = no_filters();
        let data = "0.0.0.0 ads.example.com\n0.0.0.0\n";

        let domains = parse_domains(data, &whitelist, &tlds);

        assert_eq!(domains, vec!["ads.example.com"]);
    }

    #[test]
    fn test_whitelisted_domains_are_skipped() {
        let whitelist: HashSet<String> = ["good.example.com".to_string()].into_iter().collect();
        let data = "good.example.com\nads.example.com\n";

        let domains = parse_domains(data, &whitelist, &[]);

        assert_eq!(domains, vec!["ads.example.com"]);
    }

    #[test]
    fn test_suppressed_tlds_are_skipped() {
        let (whitelist, _) = no_filters();
        let tlds = vec![".xyz".to_string(), ".top".to_string()];
        let data = "ads.example.xyz\nspam.example.top\nkeep.example.com\n";

        let domains = parse_domains(data, &whitelist, &tlds);

        assert_eq!(domains, vec!["keep.example.com"]);
    }

    #[test]
    fn test_chunk_domains() {
        let domains: Vec<String> = (0..2500).map(|i| format!("d{}.example.com", i)).collect();

        let chunks = chunk_domains(&domains, 1000);

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), 1000);
        assert_eq!(chunks[2].len(), 500);
    }

    #[test]
    fn test_chunk_domains_empty() {
        let chunks = chunk_domains(&[], 1000);
        assert!(chunks.is_empty());
    }
}
