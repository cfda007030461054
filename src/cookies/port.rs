//! Port attribute validation (versioned cookies only).

use crate::cookies::attributes::PortAttr;
use crate::cookies::draft::CookieDraft;
use crate::cookies::outcome::RejectReason;

pub(crate) fn validate_port(
    draft: &mut CookieDraft,
    attr: Option<PortAttr>,
    request_port: u16,
) -> Result<(), RejectReason> {
    if !draft.is_versioned() {
        return Ok(());
    }

    let mut ports = match attr {
        None => return Ok(()),
        Some(PortAttr::RequestPort) => vec![request_port],
        Some(PortAttr::List(ports)) => ports,
    };
    ports.sort_unstable();
    ports.dedup();
    if ports.is_empty() {
        ports.push(request_port);
    }

    if ports.binary_search(&request_port).is_err() {
        return Err(RejectReason::PortMismatch);
    }

    draft.port_list = ports;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(attr: Option<PortAttr>, port: u16, version: u32) -> (CookieDraft, Result<(), RejectReason>) {
        let mut draft = CookieDraft::new("a", "b", version);
        let result = validate_port(&mut draft, attr, port);
        (draft, result)
    }

    #[test]
    fn test_port_in_list() {
        let (draft, result) = run(Some(PortAttr::List(vec![8080, 80, 8080])), 8080, 1);
        assert!(result.is_ok());
        assert_eq!(draft.port_list, vec![80, 8080]);
    }

    #[test]
    fn test_port_not_in_list() {
        let (draft, result) = run(Some(PortAttr::List(vec![80, 8080])), 443, 1);
        assert_eq!(result, Err(RejectReason::PortMismatch));
        assert!(draft.port_list.is_empty());
    }

    #[test]
    fn test_request_port_default() {
        let (draft, result) = run(Some(PortAttr::RequestPort), 8443, 1);
        assert!(result.is_ok());
        assert_eq!(draft.port_list, vec![8443]);
    }

    #[test]
    fn test_no_port_attribute() {
        let (draft, result) = run(None, 80, 1);
        assert!(result.is_ok());
        assert!(draft.port_list.is_empty());
    }

    #[test]
    fn test_netscape_ignores_ports() {
        let (draft, result) = run(Some(PortAttr::List(vec![81])), 80, 0);
        assert!(result.is_ok());
        assert!(draft.port_list.is_empty());
    }
}
