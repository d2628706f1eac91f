//! Notification payload sent to TaskCall
//!
//! Every Nagios macro passed on the command line maps one-to-one onto a JSON
//! key. Macros that were not passed are serialized as `null` so the receiving
//! side always sees the same set of keys.

use crate::cli::Cli;
use crate::config::Config;
use crate::error::NotifyError;
use clap::{Args, ValueEnum};
use serde::Serialize;

/// Number of keys in every serialized payload
pub const PAYLOAD_KEY_COUNT: usize = 6 + HOST_FIELD_COUNT + SERVICE_FIELD_COUNT;
const HOST_FIELD_COUNT: usize = 32;
const SERVICE_FIELD_COUNT: usize = 32;

/// Whether the alert concerns a host or one of its services
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Host,
    Service,
}

/// Host macros ($HOSTNAME$, $HOSTSTATE$, ...)
#[derive(Debug, Clone, Default, PartialEq, Eq, Args, Serialize)]
#[command(next_help_heading = "Host macros")]
pub struct HostFields {
    /// Short host name
    #[arg(long = "hn", value_name = "HOSTNAME")]
    pub host_name: Option<String>,

    /// Display name of the host
    #[arg(long = "hdn", value_name = "HOSTDISPLAYNAME")]
    pub host_display_name: Option<String>,

    /// Long host name or description
    #[arg(long = "hal", value_name = "HOSTALIAS")]
    pub host_alias: Option<String>,

    /// Host address
    #[arg(long = "haddr", value_name = "HOSTADDRESS")]
    pub host_address: Option<String>,

    /// Current host state (UP, DOWN, UNREACHABLE)
    #[arg(long = "hs", value_name = "HOSTSTATE")]
    pub host_state: Option<String>,

    /// Numeric current host state
    #[arg(long = "hsi", value_name = "HOSTSTATEID")]
    pub host_state_id: Option<String>,

    /// Previous host state
    #[arg(long = "lhs", value_name = "LASTHOSTSTATE")]
    pub last_host_state: Option<String>,

    /// Numeric previous host state
    #[arg(long = "lhsi", value_name = "LASTHOSTSTATEID")]
    pub last_host_state_id: Option<String>,

    /// HARD or SOFT
    #[arg(long = "hst", value_name = "HOSTSTATETYPE")]
    pub host_state_type: Option<String>,

    /// Current check attempt
    #[arg(long = "ha", value_name = "HOSTATTEMPT")]
    pub host_attempt: Option<String>,

    /// Configured maximum check attempts
    #[arg(long = "mha", value_name = "MAXHOSTATTEMPTS")]
    pub max_host_attempts: Option<String>,

    /// Current host event id
    #[arg(long = "hei", value_name = "HOSTEVENTID")]
    pub host_event_id: Option<String>,

    /// Previous host event id
    #[arg(long = "lhei", value_name = "LASTHOSTEVENTID")]
    pub last_host_event_id: Option<String>,

    /// Current host problem id
    #[arg(long = "hpi", value_name = "HOSTPROBLEMID")]
    pub host_problem_id: Option<String>,

    /// Previous host problem id
    #[arg(long = "lhpi", value_name = "LASTHOSTPROBLEMID")]
    pub last_host_problem_id: Option<String>,

    /// Check latency in seconds
    #[arg(long = "hl", value_name = "HOSTLATENCY")]
    pub host_latency: Option<String>,

    /// Check execution time in seconds
    #[arg(long = "het", value_name = "HOSTEXECUTIONTIME")]
    pub host_execution_time: Option<String>,

    /// Time spent in the current state
    #[arg(long = "hd", value_name = "HOSTDURATION")]
    pub host_duration: Option<String>,

    /// Time spent in the current state, in seconds
    #[arg(long = "hds", value_name = "HOSTDURATIONSEC")]
    pub host_duration_sec: Option<String>,

    /// Scheduled downtime depth
    #[arg(long = "hdt", value_name = "HOSTDOWNTIME")]
    pub host_down_time: Option<String>,

    /// Flapping state change percentage
    #[arg(long = "hpc", value_name = "HOSTPERCENTCHANGE")]
    pub host_percent_change: Option<String>,

    /// Primary host group
    #[arg(long = "hgn", value_name = "HOSTGROUPNAME")]
    pub host_group_name: Option<String>,

    /// Every host group of the host
    #[arg(long = "hgns", value_name = "HOSTGROUPNAMES")]
    pub host_group_names: Option<String>,

    /// Timestamp of the last check
    #[arg(long = "lhc", value_name = "LASTHOSTCHECK")]
    pub last_host_check: Option<String>,

    /// Timestamp of the last state change
    #[arg(long = "lhsc", value_name = "LASTHOSTSTATECHANGE")]
    pub last_host_state_change: Option<String>,

    /// Timestamp of the last UP state
    #[arg(long = "lhu", value_name = "LASTHOSTUP")]
    pub last_host_up: Option<String>,

    /// Timestamp of the last DOWN state
    #[arg(long = "lhd", value_name = "LASTHOSTDOWN")]
    pub last_host_down: Option<String>,

    /// Timestamp of the last UNREACHABLE state
    #[arg(long = "lhur", value_name = "LASTHOSTUNREACHABLE")]
    pub last_host_unreachable: Option<String>,

    /// First line of the check output
    #[arg(long = "ho", value_name = "HOSTOUTPUT")]
    pub host_output: Option<String>,

    /// Remaining lines of the check output
    #[arg(long = "lho", value_name = "LONGHOSTOUTPUT")]
    pub long_host_output: Option<String>,

    /// Notes URL of the host
    #[arg(long = "hnu", value_name = "HOSTNOTESURL")]
    pub host_notes_url: Option<String>,

    /// Performance data of the last check
    #[arg(long = "hpd", value_name = "HOSTPERFDATA")]
    pub host_perf_data: Option<String>,
}

/// Service macros ($SERVICEDESC$, $SERVICESTATE$, ...)
#[derive(Debug, Clone, Default, PartialEq, Eq, Args, Serialize)]
#[command(next_help_heading = "Service macros")]
pub struct ServiceFields {
    /// Service description
    #[arg(long = "s", value_name = "SERVICEDESC")]
    pub service_desc: Option<String>,

    /// Display name of the service
    #[arg(long = "sdn", value_name = "SERVICEDISPLAYNAME")]
    pub service_display_name: Option<String>,

    /// Current service state (OK, WARNING, CRITICAL, UNKNOWN)
    #[arg(long = "ss", value_name = "SERVICESTATE")]
    pub service_state: Option<String>,

    /// Numeric current service state
    #[arg(long = "ssi", value_name = "SERVICESTATEID")]
    pub service_state_id: Option<String>,

    /// Previous service state
    #[arg(long = "lss", value_name = "LASTSERVICESTATE")]
    pub last_service_state: Option<String>,

    /// Numeric previous service state
    #[arg(long = "lssi", value_name = "LASTSERVICESTATEID")]
    pub last_service_state_id: Option<String>,

    /// HARD or SOFT
    #[arg(long = "sst", value_name = "SERVICESTATETYPE")]
    pub service_state_type: Option<String>,

    /// Current check attempt
    #[arg(long = "sa", value_name = "SERVICEATTEMPT")]
    pub service_attempt: Option<String>,

    /// Configured maximum check attempts
    #[arg(long = "msa", value_name = "MAXSERVICEATTEMPTS")]
    pub max_service_attempts: Option<String>,

    /// Whether the service is volatile
    #[arg(long = "siv", value_name = "SERVICEISVOLATILE")]
    pub service_is_volatile: Option<String>,

    /// Current service event id
    #[arg(long = "sei", value_name = "SERVICEEVENTID")]
    pub service_event_id: Option<String>,

    /// Previous service event id
    #[arg(long = "lsei", value_name = "LASTSERVICEEVENTID")]
    pub last_service_event_id: Option<String>,

    /// Current service problem id
    #[arg(long = "spi", value_name = "SERVICEPROBLEMID")]
    pub service_problem_id: Option<String>,

    /// Previous service problem id
    #[arg(long = "lspi", value_name = "LASTSERVICEPROBLEMID")]
    pub last_service_problem_id: Option<String>,

    /// Check latency in seconds
    #[arg(long = "sl", value_name = "SERVICELATENCY")]
    pub service_latency: Option<String>,

    /// Check execution time in seconds
    #[arg(long = "set", value_name = "SERVICEEXECUTIONTIME")]
    pub service_execution_time: Option<String>,

    /// Time spent in the current state
    #[arg(long = "sd", value_name = "SERVICEDURATION")]
    pub service_duration: Option<String>,

    /// Time spent in the current state, in seconds
    #[arg(long = "sds", value_name = "SERVICEDURATIONSEC")]
    pub service_duration_sec: Option<String>,

    /// Scheduled downtime depth
    #[arg(long = "sdt", value_name = "SERVICEDOWNTIME")]
    pub service_down_time: Option<String>,

    /// Flapping state change percentage
    #[arg(long = "spc", value_name = "SERVICEPERCENTCHANGE")]
    pub service_percent_change: Option<String>,

    /// Primary service group
    #[arg(long = "sgn", value_name = "SERVICEGROUPNAME")]
    pub service_group_name: Option<String>,

    /// Every service group of the service
    #[arg(long = "sgns", value_name = "SERVICEGROUPNAMES")]
    pub service_group_names: Option<String>,

    /// Timestamp of the last check
    #[arg(long = "lsch", value_name = "LASTSERVICECHECK")]
    pub last_service_check: Option<String>,

    /// Timestamp of the last state change
    #[arg(long = "lssc", value_name = "LASTSERVICESTATECHANGE")]
    pub last_service_state_change: Option<String>,

    /// Timestamp of the last OK state
    #[arg(long = "lsok", value_name = "LASTSERVICEOK")]
    pub last_service_ok: Option<String>,

    /// Timestamp of the last WARNING state
    #[arg(long = "lsw", value_name = "LASTSERVICEWARNING")]
    pub last_service_warning: Option<String>,

    /// Timestamp of the last UNKNOWN state
    #[arg(long = "lsu", value_name = "LASTSERVICEUNKNOWN")]
    pub last_service_unknown: Option<String>,

    /// Timestamp of the last CRITICAL state
    #[arg(long = "lsc", value_name = "LASTSERVICECRITICAL")]
    pub last_service_critical: Option<String>,

    /// First line of the check output
    #[arg(long = "so", value_name = "SERVICEOUTPUT")]
    pub service_output: Option<String>,

    /// Remaining lines of the check output
    #[arg(long = "lso", value_name = "LONGSERVICEOUTPUT")]
    pub long_service_output: Option<String>,

    /// Notes URL of the service
    #[arg(long = "snu", value_name = "SERVICENOTESURL")]
    pub service_notes_url: Option<String>,

    /// Performance data of the last check
    #[arg(long = "spd", value_name = "SERVICEPERFDATA")]
    pub service_perf_data: Option<String>,
}

/// Body of the POST request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationPayload {
    pub integration_key: Option<String>,
    pub nagios_server: Option<String>,
    pub log_path: Option<String>,
    pub entity_type: Option<EntityType>,
    pub notification_type: Option<String>,
    pub long_date_time: Option<String>,
    #[serde(flatten)]
    pub host: HostFields,
    #[serde(flatten)]
    pub service: ServiceFields,
}

impl NotificationPayload {
    /// Map the parsed flags onto the payload.
    ///
    /// Integration key, server name and log path fall back to the merged
    /// configuration when their flag is absent or empty.
    pub fn from_cli(cli: &Cli, config: &Config) -> Self {
        Self {
            integration_key: flag_or_config(cli.integration_key.as_deref(), &config.integration_key),
            nagios_server: flag_or_config(cli.nagios_server.as_deref(), &config.nagios_server),
            log_path: flag_or_config(
                cli.log_path.as_deref().and_then(|p| p.to_str()),
                &config.log_path.to_string_lossy(),
            ),
            entity_type: cli.entity_type,
            notification_type: cli.notification_type.clone(),
            long_date_time: cli.long_date_time.clone(),
            host: cli.host.clone(),
            service: cli.service.clone(),
        }
    }

    /// Preconditions checked before any network call
    pub fn validate(&self) -> Result<(), NotifyError> {
        if is_blank(self.notification_type.as_deref()) {
            return Err(NotifyError::MissingNotificationType);
        }
        if is_blank(self.integration_key.as_deref()) {
            return Err(NotifyError::MissingIntegrationKey);
        }
        Ok(())
    }

    pub fn integration_key(&self) -> Option<&str> {
        self.integration_key.as_deref().filter(|k| !k.trim().is_empty())
    }

    /// One-line summary used in the "Processing request" log line
    pub fn describe(&self) -> String {
        let shown = |value: &Option<String>| value.as_deref().unwrap_or("-").to_string();
        match self.entity_type {
            Some(EntityType::Host) => format!(
                "HostName: {}, HostState: {}",
                shown(&self.host.host_name),
                shown(&self.host.host_state)
            ),
            _ => format!(
                "HostName: {}, ServiceDesc: {}, ServiceState: {}",
                shown(&self.host.host_name),
                shown(&self.service.service_desc),
                shown(&self.service.service_state)
            ),
        }
    }
}

fn flag_or_config(flag: Option<&str>, configured: &str) -> Option<String> {
    match flag {
        Some(value) if !value.is_empty() => Some(value.to_string()),
        _ if !configured.is_empty() => Some(configured.to_string()),
        _ => None,
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{normalize_args, Cli};
    use clap::Parser;

    fn parse(args: &[&str]) -> Cli {
        let argv = std::iter::once("send-to-taskcall").chain(args.iter().copied());
        Cli::parse_from(normalize_args(argv))
    }

    #[test]
    fn test_unset_macros_serialize_as_null() {
        let cli = parse(&["-ntt", "PROBLEM", "-entityType", "host", "-hn", "web01"]);
        let payload = NotificationPayload::from_cli(&cli, &Config::default());

        let json = serde_json::to_value(&payload).unwrap();
        let object = json.as_object().unwrap();

        assert_eq!(object.len(), PAYLOAD_KEY_COUNT);
        assert_eq!(object["host_name"], "web01");
        assert_eq!(object["entity_type"], "host");
        assert!(object["host_state"].is_null());
        assert!(object["service_perf_data"].is_null());
        assert!(object["long_date_time"].is_null());
    }

    #[test]
    fn test_every_host_and_service_flag_maps_to_its_key() {
        let cli = parse(&[
            "-ntt", "RECOVERY", "-entityType", "service", "-hs", "UP", "-lhur", "1700000000",
            "-hpd", "rta=0.5ms", "-s", "HTTP", "-set", "0.02", "-lsc", "1700000100",
            "-spd", "time=0.1s",
        ]);
        let payload = NotificationPayload::from_cli(&cli, &Config::default());

        assert_eq!(payload.host.host_state.as_deref(), Some("UP"));
        assert_eq!(payload.host.last_host_unreachable.as_deref(), Some("1700000000"));
        assert_eq!(payload.host.host_perf_data.as_deref(), Some("rta=0.5ms"));
        assert_eq!(payload.service.service_desc.as_deref(), Some("HTTP"));
        assert_eq!(payload.service.service_execution_time.as_deref(), Some("0.02"));
        assert_eq!(payload.service.last_service_critical.as_deref(), Some("1700000100"));
        assert_eq!(payload.service.service_perf_data.as_deref(), Some("time=0.1s"));
    }

    #[test]
    fn test_flags_win_over_config() {
        let mut config = Config::default();
        config.apply_overrides("integration_key=from-file\nnagios_server=file-server\n");

        let cli = parse(&["-ntt", "PROBLEM", "-integKey", "from-flag"]);
        let payload = NotificationPayload::from_cli(&cli, &config);

        assert_eq!(payload.integration_key.as_deref(), Some("from-flag"));
        assert_eq!(payload.nagios_server.as_deref(), Some("file-server"));
        assert_eq!(
            payload.log_path.as_deref(),
            Some("/var/log/taskcall-nagios/send_to_taskcall.log")
        );
    }

    #[test]
    fn test_missing_notification_type_rejected() {
        let cli = parse(&["-entityType", "host", "-integKey", "abc"]);
        let payload = NotificationPayload::from_cli(&cli, &Config::default());
        assert!(matches!(payload.validate(), Err(NotifyError::MissingNotificationType)));

        let cli = parse(&["-entityType", "host", "-integKey", "abc", "-ntt", ""]);
        let payload = NotificationPayload::from_cli(&cli, &Config::default());
        assert!(matches!(payload.validate(), Err(NotifyError::MissingNotificationType)));
    }

    #[test]
    fn test_missing_integration_key_rejected() {
        let cli = parse(&["-ntt", "PROBLEM"]);
        let payload = NotificationPayload::from_cli(&cli, &Config::default());
        assert!(matches!(payload.validate(), Err(NotifyError::MissingIntegrationKey)));
    }

    #[test]
    fn test_describe_host_and_service() {
        let cli = parse(&["-entityType", "host", "-hn", "db01", "-hs", "DOWN"]);
        let payload = NotificationPayload::from_cli(&cli, &Config::default());
        assert_eq!(payload.describe(), "HostName: db01, HostState: DOWN");

        let cli = parse(&["-entityType", "service", "-hn", "db01", "-s", "MySQL"]);
        let payload = NotificationPayload::from_cli(&cli, &Config::default());
        assert_eq!(payload.describe(), "HostName: db01, ServiceDesc: MySQL, ServiceState: -");
    }
}
