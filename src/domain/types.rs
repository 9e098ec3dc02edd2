//! OCPP 1.6 enumerations.
//!
//! Wire tokens follow the spelling in the OCPP 1.6 specification. Enums that
//! appear in UI snapshots additionally expose the numeric ordinal the
//! supervisory web client renders.

use strum::{EnumIter, EnumString, IntoStaticStr};

/// Registration status of a charge point, as answered in BootNotification.
///
/// A session starts out `Rejected`; nothing but a BootNotification is
/// accepted until the charger has booted successfully.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum BootStatus {
    Accepted = 0,
    Pending = 1,
    Rejected = 2,
}

impl BootStatus {
    pub fn token(&self) -> &'static str {
        match self {
            Self::Accepted => "Accepted",
            Self::Pending => "Pending",
            Self::Rejected => "Rejected",
        }
    }

    /// Numeric form used by the operator UI.
    pub fn ordinal(&self) -> u8 {
        *self as u8
    }
}

/// Connector status as reported by StatusNotification.
///
/// `Unknown` is a local sentinel for a connector that has not reported yet;
/// it is never a valid wire token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ConnectorStatus {
    Available = 0,
    Charging = 1,
    Faulted = 2,
    Finishing = 3,
    Preparing = 4,
    Reserved = 5,
    SuspendedEv = 6,
    SuspendedEvse = 7,
    Unavailable = 8,
    Unknown = 9,
}

impl ConnectorStatus {
    pub fn from_token(token: &str) -> Option<Self> {
        Some(match token {
            "Available" => Self::Available,
            "Charging" => Self::Charging,
            "Faulted" => Self::Faulted,
            "Finishing" => Self::Finishing,
            "Preparing" => Self::Preparing,
            "Reserved" => Self::Reserved,
            "SuspendedEV" => Self::SuspendedEv,
            "SuspendedEVSE" => Self::SuspendedEvse,
            "Unavailable" => Self::Unavailable,
            _ => return None,
        })
    }

    pub fn token(&self) -> &'static str {
        match self {
            Self::Available => "Available",
            Self::Charging => "Charging",
            Self::Faulted => "Faulted",
            Self::Finishing => "Finishing",
            Self::Preparing => "Preparing",
            Self::Reserved => "Reserved",
            Self::SuspendedEv => "SuspendedEV",
            Self::SuspendedEvse => "SuspendedEVSE",
            Self::Unavailable => "Unavailable",
            Self::Unknown => "Unknown",
        }
    }

    /// Numeric form used by the operator UI.
    pub fn ordinal(&self) -> u8 {
        *self as u8
    }

    /// A transaction may only start on a connector that is neither faulted,
    /// suspended nor unavailable.
    pub fn chargeable(&self) -> bool {
        !matches!(
            self,
            Self::Faulted | Self::SuspendedEv | Self::SuspendedEvse | Self::Unavailable
        )
    }
}

/// Charge point error code carried by StatusNotification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, IntoStaticStr)]
pub enum ChargePointErrorCode {
    ConnectorLockFailure,
    EVCommunicationError,
    GroundFailure,
    HighTemperature,
    InternalError,
    LocalListConflict,
    NoError,
    OtherError,
    OverCurrentFailure,
    OverVoltage,
    PowerMeterFailure,
    PowerSwitchFailure,
    ReaderFailure,
    ResetFailure,
    UnderVoltage,
    WeakSignal,
}

/// Reason a transaction was stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, IntoStaticStr)]
pub enum StopReason {
    DeAuthorized,
    EmergencyStop,
    EVDisconnected,
    HardReset,
    Local,
    Other,
    PowerLoss,
    Reboot,
    Remote,
    SoftReset,
    UnlockCommand,
}

/// Context of a sampled meter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, IntoStaticStr)]
pub enum ReadingContext {
    #[strum(serialize = "Interruption.Begin")]
    InterruptionBegin,
    #[strum(serialize = "Interruption.End")]
    InterruptionEnd,
    Other,
    #[strum(serialize = "Sample.Clock")]
    SampleClock,
    #[strum(serialize = "Sample.Periodic")]
    SamplePeriodic,
    #[strum(serialize = "Transaction.Begin")]
    TransactionBegin,
    #[strum(serialize = "Transaction.End")]
    TransactionEnd,
    Trigger,
}

/// Format of a sampled meter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, IntoStaticStr)]
pub enum ValueFormat {
    Raw,
    SignedData,
}

/// Measured quantity of a sampled meter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, IntoStaticStr)]
pub enum Measurand {
    #[strum(serialize = "Current.Export")]
    CurrentExport,
    #[strum(serialize = "Current.Import")]
    CurrentImport,
    #[strum(serialize = "Current.Offered")]
    CurrentOffered,
    #[strum(serialize = "Energy.Active.Export.Interval")]
    EnergyActiveExportInterval,
    #[strum(serialize = "Energy.Active.Export.Register")]
    EnergyActiveExportRegister,
    #[strum(serialize = "Energy.Active.Import.Interval")]
    EnergyActiveImportInterval,
    #[strum(serialize = "Energy.Active.Import.Register")]
    EnergyActiveImportRegister,
    #[strum(serialize = "Energy.Reactive.Export.Interval")]
    EnergyReactiveExportInterval,
    #[strum(serialize = "Energy.Reactive.Export.Register")]
    EnergyReactiveExportRegister,
    #[strum(serialize = "Energy.Reactive.Import.Interval")]
    EnergyReactiveImportInterval,
    #[strum(serialize = "Energy.Reactive.Import.Register")]
    EnergyReactiveImportRegister,
    Frequency,
    #[strum(serialize = "Power.Active.Export")]
    PowerActiveExport,
    #[strum(serialize = "Power.Active.Import")]
    PowerActiveImport,
    #[strum(serialize = "Power.Factor")]
    PowerFactor,
    #[strum(serialize = "Power.Offered")]
    PowerOffered,
    #[strum(serialize = "Power.Reactive.Export")]
    PowerReactiveExport,
    #[strum(serialize = "Power.Reactive.Import")]
    PowerReactiveImport,
    RPM,
    SoC,
    Temperature,
    Voltage,
}

/// Phase a sampled value was measured on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, IntoStaticStr)]
pub enum Phase {
    L1,
    L2,
    L3,
    N,
    #[strum(serialize = "L1-N")]
    L1N,
    #[strum(serialize = "L2-N")]
    L2N,
    #[strum(serialize = "L3-N")]
    L3N,
    #[strum(serialize = "L1-L2")]
    L1L2,
    #[strum(serialize = "L2-L3")]
    L2L3,
    #[strum(serialize = "L3-L1")]
    L3L1,
}

/// Where a sampled value was measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, IntoStaticStr)]
pub enum Location {
    Body,
    Cable,
    EV,
    Inlet,
    Outlet,
}

/// Unit of a sampled meter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, IntoStaticStr)]
pub enum UnitOfMeasure {
    Wh,
    #[strum(serialize = "kWh")]
    KWh,
    #[strum(serialize = "varh")]
    Varh,
    #[strum(serialize = "kvarh")]
    Kvarh,
    W,
    #[strum(serialize = "kW")]
    KW,
    VA,
    #[strum(serialize = "kVA")]
    KVA,
    #[strum(serialize = "var")]
    Var,
    #[strum(serialize = "kvar")]
    Kvar,
    A,
    V,
    Celsius,
    Fahrenheit,
    K,
    Percent,
}

/// Authorization verdict returned in an idTagInfo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, IntoStaticStr)]
pub enum AuthorizationStatus {
    Accepted,
    Blocked,
    Expired,
    Invalid,
    ConcurrentTx,
}

/// DataTransfer confirmation status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, IntoStaticStr)]
pub enum DataTransferStatus {
    Accepted,
    Rejected,
    UnknownMessageId,
    UnknownVendorId,
}

/// Requested availability in ChangeAvailability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, IntoStaticStr)]
pub enum AvailabilityType {
    Inoperative,
    Operative,
}

/// ChangeAvailability confirmation status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, IntoStaticStr)]
pub enum AvailabilityStatus {
    Accepted,
    Rejected,
    Scheduled,
}

/// Requested reset kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, IntoStaticStr)]
pub enum ResetType {
    Hard,
    Soft,
}

/// Reset confirmation status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, IntoStaticStr)]
pub enum ResetStatus {
    Accepted,
    Rejected,
}

/// ClearCache confirmation status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, IntoStaticStr)]
pub enum ClearCacheStatus {
    Accepted,
    Rejected,
}

/// RemoteStart/RemoteStop confirmation status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, IntoStaticStr)]
pub enum RemoteStartStopStatus {
    Accepted,
    Rejected,
}

/// UnlockConnector confirmation status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, IntoStaticStr)]
pub enum UnlockStatus {
    Unlocked,
    UnlockFailed,
    NotSupported,
}

/// The closed set of standard configuration keys tracked per charger.
///
/// Values reported by GetConfiguration for any other key are carried in the
/// response's `unknownKey` list and not retained.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, EnumIter, EnumString, IntoStaticStr,
)]
pub enum ConfigKey {
    AuthorizeRemoteTxRequests,
    ClockAlignedDataInterval,
    ConnectionTimeOut,
    ConnectorPhaseRotation,
    GetConfigurationMaxKeys,
    HeartbeatInterval,
    LocalAuthorizeOffline,
    LocalPreAuthorize,
    MeterValuesAlignedData,
    MeterValuesSampledData,
    MeterValueSampleInterval,
    NumberOfConnectors,
    ResetRetries,
    StopTransactionOnEVSideDisconnect,
    StopTransactionOnInvalidId,
    StopTxnAlignedData,
    StopTxnSampledData,
    SupportedFeatureProfiles,
    TransactionMessageAttempts,
    TransactionMessageRetryInterval,
    UnlockConnectorOnEVSideDisconnect,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn connector_status_tokens_round_trip() {
        for token in [
            "Available",
            "Charging",
            "Faulted",
            "Finishing",
            "Preparing",
            "Reserved",
            "SuspendedEV",
            "SuspendedEVSE",
            "Unavailable",
        ] {
            let status = ConnectorStatus::from_token(token).unwrap();
            assert_eq!(status.token(), token);
        }
        // The local sentinel is not a wire token.
        assert_eq!(ConnectorStatus::from_token("Unknown"), None);
    }

    #[test]
    fn connector_ordinals_match_ui_encoding() {
        assert_eq!(ConnectorStatus::Available.ordinal(), 0);
        assert_eq!(ConnectorStatus::Unavailable.ordinal(), 8);
        assert_eq!(ConnectorStatus::Unknown.ordinal(), 9);
        assert_eq!(BootStatus::Accepted.ordinal(), 0);
        assert_eq!(BootStatus::Rejected.ordinal(), 2);
    }

    #[test]
    fn dotted_tokens_parse() {
        assert_eq!(
            ReadingContext::from_str("Sample.Periodic").unwrap(),
            ReadingContext::SamplePeriodic
        );
        assert_eq!(
            Measurand::from_str("Energy.Active.Import.Register").unwrap(),
            Measurand::EnergyActiveImportRegister
        );
        let token: &'static str = Measurand::PowerActiveImport.into();
        assert_eq!(token, "Power.Active.Import");
    }

    #[test]
    fn unknown_tokens_are_rejected() {
        assert!(StopReason::from_str("EVDisconnect").is_err());
        assert!(UnitOfMeasure::from_str("Celcius").is_err());
    }
}
