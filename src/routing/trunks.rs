use crate::models::{param_root, PanelConfig, ParameterKey, ParameterMap, TrunkConfig, TrunkMode, TrunkSide};

/// Trunk A is index 0, trunk B index 1
pub const TRUNK_A: u32 = 0;
pub const TRUNK_B: u32 = 1;

/// Apply the documented fallbacks to one configured trunk side
pub fn resolve_trunk(side: Option<&TrunkSide>, index: u32) -> TrunkConfig {
    let default_side = TrunkSide::default();
    let side = side.unwrap_or(&default_side);
    let default_prefix = if index == TRUNK_A { "10.20." } else { "10.120." };

    TrunkConfig {
        mode: TrunkMode::from_label(side.mode.as_deref().unwrap_or("Auto (DHCP)")),
        prefix: side.prefix.clone().unwrap_or_else(|| default_prefix.to_string()),
        suffix: side
            .suffix
            .as_deref()
            .unwrap_or("")
            .trim()
            .trim_start_matches('.')
            .to_string(),
        subnet_mask: side
            .subnet_mask
            .clone()
            .unwrap_or_else(|| "255.255.255.252".to_string()),
        gateway: side.gateway.clone().unwrap_or_default(),
    }
}

/// Parameters for one trunk side.
///
/// The DHCP toggle is written first and reads `1` for DHCP, `0` for static;
/// that is the device's convention. Only static mode adds IP, mask and
/// gateway, each omitted when empty.
pub fn trunk_params(trunk: &TrunkConfig, index: u32) -> ParameterMap {
    let mut params = ParameterMap::new();
    let dhcp = match trunk.mode {
        TrunkMode::Dhcp => "1",
        TrunkMode::Static => "0",
    };
    params.insert(ParameterKey::new(param_root::TRUNK_DHCP, vec![index]), dhcp);

    if trunk.mode == TrunkMode::Static {
        if trunk.suffix.is_empty() {
            tracing::warn!("Trunk {} is static but has no address suffix; leaving IP unset", index);
        } else {
            params.insert(
                ParameterKey::new(param_root::TRUNK_IP, vec![index]),
                format!("{}{}", trunk.prefix, trunk.suffix),
            );
        }
        if !trunk.subnet_mask.is_empty() {
            params.insert(ParameterKey::new(param_root::TRUNK_MASK, vec![index]), trunk.subnet_mask.clone());
        }
        if !trunk.gateway.is_empty() {
            params.insert(ParameterKey::new(param_root::TRUNK_GATEWAY, vec![index]), trunk.gateway.clone());
        }
    }
    params
}

/// Trunk A then trunk B parameters from `SCORPION_TRUNKS`
pub fn build_trunk_params(cfg: &PanelConfig) -> ParameterMap {
    let trunks = &cfg.scorpion_trunks;
    let mut params = trunk_params(&resolve_trunk(trunks.a.as_ref(), TRUNK_A), TRUNK_A);
    params.extend(
        trunk_params(&resolve_trunk(trunks.b.as_ref(), TRUNK_B), TRUNK_B)
            .iter()
            .map(|(k, v)| (k.clone(), v.to_string())),
    );
    params
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(params: &ParameterMap) -> Vec<(String, String)> {
        params.to_query_pairs()
    }

    #[test]
    fn test_dhcp_side_emits_only_toggle() {
        let side = TrunkSide {
            mode: Some("Auto (DHCP)".into()),
            prefix: Some("10.20.".into()),
            suffix: Some("34.10".into()),
            gateway: Some("10.20.34.9".into()),
            ..Default::default()
        };
        let params = trunk_params(&resolve_trunk(Some(&side), TRUNK_A), TRUNK_A);
        assert_eq!(pairs(&params), vec![("6022.0".to_string(), "1".to_string())]);
    }

    #[test]
    fn test_static_side_emits_addressing() {
        let side = TrunkSide {
            mode: Some("Static".into()),
            suffix: Some(".34.10".into()),
            gateway: Some("10.120.34.9".into()),
            ..Default::default()
        };
        let params = trunk_params(&resolve_trunk(Some(&side), TRUNK_B), TRUNK_B);
        assert_eq!(
            pairs(&params),
            vec![
                ("6022.1".to_string(), "0".to_string()),
                ("6000.1".to_string(), "10.120.34.10".to_string()),
                ("6001.1".to_string(), "255.255.255.252".to_string()),
                ("6002.1".to_string(), "10.120.34.9".to_string()),
            ]
        );
    }

    #[test]
    fn test_static_without_suffix_skips_ip() {
        let side = TrunkSide {
            mode: Some("Static".into()),
            subnet_mask: Some(String::new()),
            ..Default::default()
        };
        let params = trunk_params(&resolve_trunk(Some(&side), TRUNK_A), TRUNK_A);
        assert_eq!(pairs(&params), vec![("6022.0".to_string(), "0".to_string())]);
    }

    #[test]
    fn test_build_trunk_params_defaults_to_dhcp() {
        let params = build_trunk_params(&PanelConfig::default());
        assert_eq!(
            pairs(&params),
            vec![
                ("6022.0".to_string(), "1".to_string()),
                ("6022.1".to_string(), "1".to_string()),
            ]
        );
    }

    #[test]
    fn test_build_trunk_params_mixed_sides() {
        let cfg: PanelConfig = serde_json::from_value(serde_json::json!({
            "SCORPION_TRUNKS": {
                "A": {"mode": "Static", "prefix": "10.20.", "suffix": "34.10", "subnetMask": "255.255.255.252", "gateway": "10.20.34.9"},
                "B": {"mode": "Auto (DHCP)"}
            }
        }))
        .unwrap();
        let keys: Vec<String> = build_trunk_params(&cfg).keys().map(|k| k.to_string()).collect();
        assert_eq!(keys, vec!["6022.0", "6000.0", "6001.0", "6002.0", "6022.1"]);
    }
}
