use crate::resolver::{IpAddrFamily, Resolution, Resolve, ResolveQuery};
use std::rc::Rc;
use std::time::Duration;

/// A cheaply cloneable resolver backed by the system `getaddrinfo`.
///
/// All clones of a handle share one background worker thread; the worker
/// exits when the last handle is dropped.
#[derive(Clone)]
pub struct DnsResolver {
    inner: Rc<inner::DnsResolver>,
}

impl DnsResolver {
    /// Create and start a new `DnsResolver`.
    pub fn start() -> std::io::Result<Self> {
        Ok(Self {
            inner: Rc::new(inner::DnsResolver::start()?),
        })
    }
}

impl Resolve for DnsResolver {
    fn begin_lookup(&self, hostname: &str, family: IpAddrFamily) -> ResolveQuery {
        self.inner.begin_lookup(hostname, family)
    }

    fn cancel(&self, query: ResolveQuery) {
        self.inner.cancel(query);
    }

    fn poll(&self, timeout: Duration) -> Option<Resolution> {
        self.inner.poll(timeout)
    }
}

/// Private impl of resolver.
mod inner {
    use crate::resolver::{Error, IpAddrFamily, Resolution, ResolveQuery, Result};
    use crossbeam::channel::{unbounded, Receiver, Sender};
    use parking_lot::Mutex;
    use std::cell::Cell;
    use std::collections::HashSet;
    use std::net::IpAddr;
    use std::str::FromStr;
    use std::thread;
    use std::time::{Duration, Instant};

    /// One enqueued forward lookup.
    struct LookupRequest {
        query: ResolveQuery,
        hostname: String,
        family: IpAddrFamily,
    }

    /// Resolver implementation.
    pub(super) struct DnsResolver {
        tx: Sender<LookupRequest>,
        rx: Receiver<Resolution>,
        next_query: Cell<u64>,
        cancelled: Mutex<HashSet<ResolveQuery>>,
    }

    impl DnsResolver {
        pub(super) fn start() -> std::io::Result<Self> {
            let (request_tx, request_rx) = unbounded::<LookupRequest>();
            let (resolution_tx, resolution_rx) = unbounded::<Resolution>();
            thread::Builder::new()
                .name(String::from("dns-lookup"))
                .spawn(move || lookup_queue_processor(&request_rx, &resolution_tx))?;
            Ok(Self {
                tx: request_tx,
                rx: resolution_rx,
                next_query: Cell::new(0),
                cancelled: Mutex::new(HashSet::new()),
            })
        }

        pub(super) fn begin_lookup(&self, hostname: &str, family: IpAddrFamily) -> ResolveQuery {
            let query = ResolveQuery(self.next_query.get());
            self.next_query.set(query.0 + 1);
            tracing::debug!(?query, hostname, %family, "lookup enqueued");
            // The worker outlives every handle, so the send cannot fail.
            let _ = self.tx.send(LookupRequest {
                query,
                hostname: String::from(hostname),
                family,
            });
            query
        }

        pub(super) fn cancel(&self, query: ResolveQuery) {
            self.cancelled.lock().insert(query);
        }

        pub(super) fn poll(&self, timeout: Duration) -> Option<Resolution> {
            let deadline = Instant::now() + timeout;
            loop {
                let remaining = deadline.saturating_duration_since(Instant::now());
                let Ok(resolution) = self.rx.recv_timeout(remaining) else {
                    return None;
                };
                if self.cancelled.lock().remove(&resolution.query) {
                    tracing::debug!(query = ?resolution.query, "cancelled lookup discarded");
                    continue;
                }
                return Some(resolution);
            }
        }
    }

    /// Process each `LookupRequest` from the queue and post the completion.
    fn lookup_queue_processor(rx: &Receiver<LookupRequest>, tx: &Sender<Resolution>) {
        for request in rx {
            let result = lookup(&request.hostname, request.family);
            tracing::debug!(query = ?request.query, ?result, "lookup complete");
            if tx
                .send(Resolution {
                    query: request.query,
                    result,
                })
                .is_err()
            {
                return;
            }
        }
    }

    /// Resolve `hostname` to the first address of an acceptable family, in
    /// the order the system resolver returns them.
    ///
    /// Literal addresses are parsed directly and do not touch the system
    /// resolver.
    fn lookup(hostname: &str, family: IpAddrFamily) -> Result<IpAddr> {
        let all = if let Ok(addr) = IpAddr::from_str(hostname) {
            vec![addr]
        } else {
            dns_lookup::lookup_host(hostname)
                .map_err(|err| Error::LookupFailed(String::from(hostname), err))?
        };
        all.into_iter()
            .find(|addr| family.accepts(*addr))
            .ok_or_else(|| Error::HostNotFound(String::from(hostname)))
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use std::net::{Ipv4Addr, Ipv6Addr};

        #[test]
        fn test_lookup_literal_ipv4() {
            let addr = lookup("127.0.0.1", IpAddrFamily::Any).unwrap();
            assert_eq!(IpAddr::V4(Ipv4Addr::LOCALHOST), addr);
        }

        #[test]
        fn test_lookup_literal_ipv6() {
            let addr = lookup("::1", IpAddrFamily::Ipv6Only).unwrap();
            assert_eq!(IpAddr::V6(Ipv6Addr::LOCALHOST), addr);
        }

        #[test]
        fn test_lookup_family_mismatch() {
            let err = lookup("127.0.0.1", IpAddrFamily::Ipv6Only).unwrap_err();
            assert!(matches!(err, Error::HostNotFound(host) if host == "127.0.0.1"));
        }

        #[test]
        fn test_lookup_first_acceptable_wins() {
            let addrs = [
                IpAddr::V4(Ipv4Addr::new(192, 0, 2, 1)),
                IpAddr::V6(Ipv6Addr::LOCALHOST),
            ];
            let first_v6 = addrs.into_iter().find(|addr| IpAddrFamily::Ipv6Only.accepts(*addr));
            assert_eq!(Some(IpAddr::V6(Ipv6Addr::LOCALHOST)), first_v6);
            let first_any = addrs.into_iter().find(|addr| IpAddrFamily::Any.accepts(*addr));
            assert_eq!(Some(IpAddr::V4(Ipv4Addr::new(192, 0, 2, 1))), first_any);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};

    #[test]
    fn test_literal_lookup_completes() {
        let resolver = DnsResolver::start().unwrap();
        let query = resolver.begin_lookup("127.0.0.1", IpAddrFamily::Ipv4Only);
        let resolution = resolver
            .poll(Duration::from_secs(5))
            .expect("lookup should complete");
        assert_eq!(query, resolution.query);
        assert_eq!(
            IpAddr::V4(Ipv4Addr::LOCALHOST),
            resolution.result.unwrap()
        );
    }

    #[test]
    fn test_cancelled_lookup_is_never_delivered() {
        let resolver = DnsResolver::start().unwrap();
        let query = resolver.begin_lookup("127.0.0.1", IpAddrFamily::Any);
        resolver.cancel(query);
        resolver.cancel(query);
        assert!(resolver.poll(Duration::from_millis(500)).is_none());
    }

    #[test]
    fn test_completions_delivered_in_order() {
        let resolver = DnsResolver::start().unwrap();
        let first = resolver.begin_lookup("127.0.0.1", IpAddrFamily::Any);
        let second = resolver.begin_lookup("::1", IpAddrFamily::Any);
        let resolutions = [
            resolver.poll(Duration::from_secs(5)).unwrap(),
            resolver.poll(Duration::from_secs(5)).unwrap(),
        ];
        assert_eq!(first, resolutions[0].query);
        assert_eq!(second, resolutions[1].query);
    }

    #[test]
    fn test_clones_share_the_worker() {
        let resolver = DnsResolver::start().unwrap();
        let clone = resolver.clone();
        let query = clone.begin_lookup("127.0.0.1", IpAddrFamily::Any);
        let resolution = resolver.poll(Duration::from_secs(5)).unwrap();
        assert_eq!(query, resolution.query);
    }
}
