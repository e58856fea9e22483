//! Compiled-in data-id dictionary
//!
//! Descriptors for OpenTherm protocol v2.2 data-ids 0..127 plus
//! vendor-specific ids observed in the field. Keys are `"NNN"` for a bare id,
//! `"NNNR"`/`"NNNW"` for direction-specific variants of read-write ids,
//! `"NNNI"` for the input word a read carries, and `":HBn"`/`":LBn"`/`":HB"`/
//! `":LB"` suffixes for bitfield sub-fields. This is a data asset: all
//! decoding logic lives in [`crate::codec`] and [`crate::describe`].

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::codec::DataFormat;

/// One dictionary descriptor.
#[derive(Debug, Clone, Copy)]
pub struct DataPoint {
    /// Transfer directions: R and/or W, plus I (an input word accompanies a
    /// read) and O (an output word accompanies a write).
    pub dir: &'static str,
    /// Bit position within the data-value: "", "HBn", "LBn" or "a-b".
    pub pos: &'static str,
    pub fmt: DataFormat,
    pub min: f64,
    pub max: f64,
    pub units: &'static str,
    /// Description; may carry `;`-separated conditional clauses.
    pub descr: &'static str,
}

type Row = (
    &'static str, // key
    &'static str, // dir
    &'static str, // pos
    &'static str, // fmt
    f64,          // min
    f64,          // max
    &'static str, // units
    &'static str, // descr
);

#[rustfmt::skip]
static ROWS: &[Row] = &[
    ("000",      "RI", "",      "BF",   0.0, 1.0,     "",      "Master/slave status"),
    ("000I",     "R",  "",      "BF",   0.0, 1.0,     "",      "Master/slave status"),
    ("000I:HB0", "R",  "HB0",   "BF",   0.0, 1.0,     "",      "Master status: CH enable"),
    ("000I:HB1", "R",  "HB1",   "BF",   0.0, 1.0,     "",      "Master status: DHW enable"),
    ("000I:HB2", "R",  "HB2",   "BF",   0.0, 1.0,     "",      "Master status: Cooling enable"),
    ("000I:HB3", "R",  "HB3",   "BF",   0.0, 1.0,     "",      "Master status: OTC active"),
    ("000I:HB4", "R",  "HB4",   "BF",   0.0, 1.0,     "",      "Master status: CH2 enable"),
    ("000I:HB5", "R",  "HB5",   "BF",   0.0, 1.0,     "",      "Master status: Summer/winter mode"),
    ("000I:HB6", "R",  "HB6",   "BF",   0.0, 1.0,     "",      "Master status: DHW blocking"),
    ("000I:HB7", "R",  "HB7",   "BF",   0.0, 1.0,     "",      "Master status: reserved"),
    ("000:HB0",  "R",  "HB0",   "BF",   0.0, 1.0,     "",      "Master status: CH enable"),
    ("000:HB1",  "R",  "HB1",   "BF",   0.0, 1.0,     "",      "Master status: DHW enable"),
    ("000:HB2",  "R",  "HB2",   "BF",   0.0, 1.0,     "",      "Master status: Cooling enable"),
    ("000:HB3",  "R",  "HB3",   "BF",   0.0, 1.0,     "",      "Master status: OTC active"),
    ("000:HB4",  "R",  "HB4",   "BF",   0.0, 1.0,     "",      "Master status: CH2 enable"),
    ("000:HB5",  "R",  "HB5",   "BF",   0.0, 1.0,     "",      "Master status: Summer/winter mode"),
    ("000:HB6",  "R",  "HB6",   "BF",   0.0, 1.0,     "",      "Master status: DHW blocking"),
    ("000:HB7",  "R",  "HB7",   "BF",   0.0, 1.0,     "",      "Master status: reserved"),
    ("000:LB0",  "R",  "LB0",   "BF",   0.0, 1.0,     "",      "Slave Status: Fault"),
    ("000:LB1",  "R",  "LB1",   "BF",   0.0, 1.0,     "",      "Slave Status: CH mode"),
    ("000:LB2",  "R",  "LB2",   "BF",   0.0, 1.0,     "",      "Slave Status: DHW mode"),
    ("000:LB3",  "R",  "LB3",   "BF",   0.0, 1.0,     "",      "Slave Status: Flame on"),
    ("000:LB4",  "R",  "LB4",   "BF",   0.0, 1.0,     "",      "Slave Status: Cooling on"),
    ("000:LB5",  "R",  "LB5",   "BF",   0.0, 1.0,     "",      "Slave Status: CH2 active"),
    ("000:LB6",  "R",  "LB6",   "BF",   0.0, 1.0,     "",      "Slave Status: Diagnostic/service indication"),
    ("000:LB7",  "R",  "LB7",   "BF",   0.0, 1.0,     "",      "Slave Status: Electricity production"),
    ("001",      "RW", "",      "",     0.0, 100.0,   "°C",    "CH water temperature Setpoint"),
    ("001W",     "W",  "",      "F8.8", 0.0, 100.0,   "°C",    "CH water temperature Setpoint"),
    ("001R",     "R",  "",      "F8.8", 0.0, 100.0,   "°C",    "CH water temperature Setpoint"),
    ("002",      "W",  "",      "BF",   0.0, 1.0,     "",      "Master configuration"),
    ("002:LB",   "W",  "0-7",   "U8",   0.0, 255.0,   "",      "Master configuration: MemberId code"),
    ("002:HB0",  "W",  "HB0",   "BF",   0.0, 1.0,     "",      "Master configuration: Smart power"),
    ("003",      "R",  "",      "BF",   0.0, 1.0,     "",      "Slave configuration"),
    ("003:LB",   "R",  "0-7",   "U8",   0.0, 255.0,   "",      "Slave configuration: MemberId code"),
    ("003:HB0",  "R",  "HB0",   "BF",   0.0, 1.0,     "",      "Slave configuration: DHW present"),
    ("003:HB1",  "R",  "HB1",   "BF",   0.0, 1.0,     "",      "Slave configuration: On/Off control only"),
    ("003:HB2",  "R",  "HB2",   "BF",   0.0, 1.0,     "",      "Slave configuration: Cooling supported"),
    ("003:HB3",  "R",  "HB3",   "BF",   0.0, 1.0,     "",      "Slave configuration: DHW configuration"),
    ("003:HB4",  "R",  "HB4",   "BF",   0.0, 1.0,     "",      "Slave configuration: Master low-off&pump control allowed"),
    ("003:HB5",  "R",  "HB5",   "BF",   0.0, 1.0,     "",      "Slave configuration: CH2 present"),
    ("003:HB6",  "R",  "HB6",   "BF",   0.0, 1.0,     "",      "Slave configuration: Remote water filling function"),
    ("003:HB7",  "R",  "HB7",   "BF",   0.0, 1.0,     "",      "Heat/cool mode control"),
    ("004",      "RW", "",      "",     0.0, 0.0,     "",      "Slave control"),
    ("004W",     "W",  "8-15",  "U8",   0.0, 255.0,   "",      "==1 Boiler Lockout-reset;==10 Service request reset;==2 Request Water filling"),
    ("004R",     "R",  "0-7",   "U8",   0.0, 255.0,   "",      ">127 response ok;<128 response error"),
    ("005",      "R",  "",      "BF",   0.0, 1.0,     "",      "Boiler faults"),
    ("005:HB0",  "R",  "HB0",   "BF",   0.0, 1.0,     "",      "Service required"),
    ("005:HB1",  "R",  "HB1",   "BF",   0.0, 1.0,     "",      "Lockout-reset enabled"),
    ("005:HB2",  "R",  "HB2",   "BF",   0.0, 1.0,     "",      "Low water pressure"),
    ("005:HB3",  "R",  "HB3",   "BF",   0.0, 1.0,     "",      "Gas/flame fault"),
    ("005:HB4",  "R",  "HB4",   "BF",   0.0, 1.0,     "",      "Air pressure fault"),
    ("005:HB5",  "R",  "HB5",   "BF",   0.0, 1.0,     "",      "Water over-temperature"),
    ("005:LB",   "R",  "0-7",   "U8",   0.0, 255.0,   "",      "OEM fault code"),
    ("006",      "R",  "",      "BF",   0.0, 1.0,     "",      "Remote boiler parameters"),
    ("006:HB0",  "R",  "HB0",   "BF",   0.0, 1.0,     "",      "transfer-enabled: DHW setpoint"),
    ("006:HB1",  "R",  "HB1",   "BF",   0.0, 1.0,     "",      "transfer-enabled: max. CH setpoint"),
    ("006:HB2",  "R",  "HB2",   "BF",   0.0, 1.0,     "",      "transfer-enabled: param 2 (OTC HC ratio)"),
    ("006:HB3",  "R",  "HB3",   "BF",   0.0, 1.0,     "",      "transfer-enabled: param 3"),
    ("006:HB4",  "R",  "HB4",   "BF",   0.0, 1.0,     "",      "transfer-enabled: param 4"),
    ("006:HB5",  "R",  "HB5",   "BF",   0.0, 1.0,     "",      "transfer-enabled: param 5"),
    ("006:HB6",  "R",  "HB6",   "BF",   0.0, 1.0,     "",      "transfer-enabled: param 6"),
    ("006:HB7",  "R",  "HB7",   "BF",   0.0, 1.0,     "",      "transfer-enabled: param 7"),
    ("006:LB0",  "R",  "LB0",   "BF",   0.0, 1.0,     "",      "read/write: DHW setpoint"),
    ("006:LB1",  "R",  "LB1",   "BF",   0.0, 1.0,     "",      "read/write: max. CH setpoint"),
    ("006:LB2",  "R",  "LB2",   "BF",   0.0, 1.0,     "",      "read/write: param 2 (OTC HC ratio)"),
    ("006:LB3",  "R",  "LB3",   "BF",   0.0, 1.0,     "",      "read/write: param 3"),
    ("006:LB4",  "R",  "LB4",   "BF",   0.0, 1.0,     "",      "read/write: param 4"),
    ("006:LB5",  "R",  "LB5",   "BF",   0.0, 1.0,     "",      "read/write: param 5"),
    ("006:LB6",  "R",  "LB6",   "BF",   0.0, 1.0,     "",      "read/write: param 6"),
    ("006:LB7",  "R",  "LB7",   "BF",   0.0, 1.0,     "",      "read/write: param 7"),
    ("007",      "W",  "",      "F8.8", 0.0, 100.0,   "%",     "Cooling control signal"),
    ("008",      "W",  "",      "F8.8", 0.0, 100.0,   "°C",    "Control Setpoint for 2nd CH circuit"),
    ("009",      "R",  "",      "F8.8", 0.0, 30.0,    "",      "Remote override room Setpoint"),
    ("010",      "R",  "8-15",  "U8",   0.0, 255.0,   "",      "Number of Transparent-Slave-Parameters supported by slave"),
    ("011",      "RW", "",      "",     0.0, 0.0,     "",      "Index/Value of transparent slave parameter"),
    ("011R",     "R",  "",      "BF",   0.0, 9.0,     "",      "Transparent slave parameter"),
    ("011R:HB",  "R",  "8-15",  "U8",   0.0, 255.0,   "",      "Index of read transparent slave parameter"),
    ("011R:LB",  "R",  "0-7",   "U8",   0.0, 255.0,   "",      "Value of read transparent slave parameter"),
    ("011W",     "W",  "",      "BF",   0.0, 1.0,     "",      "Transparent slave parameter to write"),
    ("011W:HB",  "W",  "8-15",  "U8",   0.0, 255.0,   "",      "Index of referred-to transparent slave parameter to write"),
    ("011W:LB",  "W",  "0-7",   "U8",   0.0, 255.0,   "",      "Value of referred-to transparent slave parameter to write"),
    ("012",      "R",  "8-15",  "U8",   0.0, 255.0,   "",      "Size of Fault-History-Buffer supported by slave"),
    ("013",      "R",  "",      "BF",   0.0, 1.0,     "",      "Fault-history buffer entry"),
    ("013:HB",   "R",  "8-15",  "U8",   0.0, 255.0,   "",      "Index number"),
    ("013:LB",   "R",  "0-7",   "U8",   0.0, 255.0,   "",      "Entry Value"),
    ("014",      "W",  "",      "F8.8", 0.0, 100.0,   "",      "Maximum relative modulation level setting (%)"),
    ("015",      "R",  "",      "BF",   0.0, 0.0,     "",      "Boiler capacities"),
    ("015:HB",   "R",  "8-15",  "U8",   0.0, 255.0,   "kW",    "Maximum boiler capacity"),
    ("015:LB",   "R",  "0-7",   "U8",   0.0, 100.0,   "%",     "Minimum boiler modulation level"),
    ("016",      "W",  "",      "F8.8", -40.0, 127.0, "°C",    "Room Setpoint"),
    ("017",      "R",  "",      "F8.8", 0.0, 100.0,   "%",     "Relative Modulation Level"),
    ("018",      "R",  "",      "F8.8", 0.0, 5.0,     "bar",   "Water pressure in CH circuit"),
    ("019",      "R",  "",      "F8.8", 0.0, 16.0,    "l/min", "Water flow rate in DHW circuit"),
    ("020",      "RW", "",      "",     0.0, 0.0,     "",      "Time and DoW"),
    ("020R",     "R",  "",      "BF",   0.0, 0.0,     "",      ""),
    ("020R:HB0", "R",  "13-15", "U8",   0.0, 7.0,     "",      "Day of Week"),
    ("020R:HB1", "R",  "8-12",  "U8",   0.0, 23.0,    "",      "Hours"),
    ("020R:LB",  "R",  "0-7",   "U8",   0.0, 59.0,    "",      "Minutes"),
    ("020W",     "W",  "",      "",     0.0, 0.0,     "",      "Day of Week and Time of Day"),
    ("020W:HB0", "W",  "13-15", "U8",   0.0, 7.0,     "",      "Day of Week"),
    ("020W:HB1", "W",  "8-12",  "U8",   0.0, 23.0,    "",      "Hours"),
    ("020W:LB",  "W",  "0-7",   "U8",   0.0, 59.0,    "",      "Minutes"),
    ("021",      "RW", "",      "",     0.0, 0.0,     "",      "Calendar date"),
    ("021R",     "R",  "",      "BF",   0.0, 0.0,     "",      "Calendar date"),
    ("021R:HB",  "R",  "8-15",  "U8",   1.0, 12.0,    "",      "Month"),
    ("021R:LB",  "R",  "0-7",   "U8",   1.0, 31.0,    "",      "Day"),
    ("021W",     "W",  "",      "BF",   0.0, 0.0,     "",      ""),
    ("021W:HB",  "W",  "8-15",  "U8",   1.0, 12.0,    "",      "Month"),
    ("021W:LB",  "W",  "0-7",   "U8",   1.0, 31.0,    "",      "Day"),
    ("022",      "RW", "",      "",     0.0, 0.0,     "",      "Calendar year"),
    ("022R",     "R",  "",      "U16",  0.0, 65535.0, "",      "Year"),
    ("022W",     "W",  "",      "U16",  0.0, 65535.0, "",      "Year"),
    ("023",      "W",  "",      "F8.8", -40.0, 127.0, "°C",    "Room Setpoint for 2nd CH circuit"),
    ("024",      "W",  "",      "F8.8", -40.0, 127.0, "°C",    "Room temperature (°C)"),
    ("025",      "R",  "",      "F8.8", -40.0, 127.0, "°C",    "Boiler flow water temperature"),
    ("026",      "R",  "",      "F8.8", -40.0, 127.0, "°C",    "DHW temperature"),
    ("027",      "R",  "",      "F8.8", -40.0, 127.0, "°C",    "Outside temperature"),
    ("028",      "R",  "",      "F8.8", -40.0, 127.0, "°C",    "Return water temperature"),
    ("029",      "R",  "",      "F8.8", -40.0, 127.0, "°C",    "Solar storage temperature"),
    ("030",      "R",  "",      "S16",  -40.0, 250.0, "°C",    "Solar collector temperature"),
    ("031",      "R",  "",      "F8.8", -40.0, 127.0, "°C",    "Flow water temperature CH2 circuit"),
    ("032",      "R",  "",      "F8.8", -40.0, 127.0, "°C",    "Domestic hot water temperature 2"),
    ("033",      "R",  "",      "S16",  -40.0, 500.0, "°C",    "Boiler exhaust temperature"),
    ("034",      "R",  "",      "F8.8", -40.0, 127.0, "°C",    "Boiler heat exchanger temperature"),
    ("035",      "R",  "",      "U16",  0.0, 0.0,     "",      "Boiler fan speed setpoint"),
    ("036",      "R",  "",      "F8.8", -128.0, 127.0, "µA",   "Electrical current through burner flame"),
    ("037",      "W",  "",      "F8.8", -40.0, 127.0, "°C",    "Room temperature for 2nd CH circuit"),
    ("038",      "W",  "",      "F8.8", 0.0, 0.0,     "%",     "Relative Humidity"),
    ("048",      "R",  "",      "BF",   0.0, 0.0,     "",      "DHW Setpoint bounds for adjustment"),
    ("048:HB",   "R",  "8-15",  "S8",   0.0, 127.0,   "°C",    "Upper bound"),
    ("048:LB",   "R",  "0-7",   "S8",   0.0, 127.0,   "°C",    "Lower bound"),
    ("049",      "R",  "",      "BF",   0.0, 0.0,     "°C",    "Max CH water Setpoint bounds for adjustment"),
    ("049:HB",   "R",  "8-15",  "S8",   0.0, 127.0,   "°C",    "Upper bound"),
    ("049:LB",   "R",  "0-7",   "S8",   0.0, 127.0,   "°C",    "Lower bound"),
    ("050",      "R",  "",      "BF",   0.0, 0.0,     "",      "OTC HC-Ratio bounds"),
    ("050:HB",   "R",  "8-15",  "S8",   -128.0, 127.0, "",     "Upper bound"),
    ("050:LB",   "R",  "0-7",   "S8",   -128.0, 127.0, "",     "Lower bound"),
    ("051",      "R",  "",      "BF",   0.0, 0.0,     "",      "Remote param 3"),
    ("051:HB",   "R",  "8-15",  "S8",   -128.0, 127.0, "",     "Upper bound"),
    ("051:LB",   "R",  "0-7",   "S8",   -128.0, 127.0, "",     "Lower bound"),
    ("052",      "R",  "",      "BF",   0.0, 0.0,     "",      "Remote param 4"),
    ("052:HB",   "R",  "8-15",  "S8",   -128.0, 127.0, "",     "Upper bound"),
    ("052:LB",   "R",  "0-7",   "S8",   -128.0, 127.0, "",     "Lower bound"),
    ("053",      "R",  "",      "BF",   0.0, 0.0,     "",      "Remote param 5"),
    ("053:HB",   "R",  "8-15",  "S8",   -128.0, 127.0, "",     "Upper bound"),
    ("053:LB",   "R",  "0-7",   "S8",   -128.0, 127.0, "",     "Lower bound"),
    ("054",      "R",  "",      "BF",   0.0, 0.0,     "",      "Remote param 6"),
    ("054:HB",   "R",  "8-15",  "S8",   -128.0, 127.0, "",     "Upper bound"),
    ("054:LB",   "R",  "0-7",   "S8",   -128.0, 127.0, "",     "Lower bound"),
    ("055",      "R",  "",      "BF",   0.0, 0.0,     "",      "Remote param 7"),
    ("055:HB",   "R",  "8-15",  "S8",   -128.0, 127.0, "",     "Upper bound"),
    ("055:LB",   "R",  "0-7",   "S8",   -128.0, 127.0, "",     "Lower bound"),
    ("056",      "RW", "",      "",     0.0, 0.0,     "°C",    "DHW Setpoint (Remote param 0)"),
    ("056R",     "R",  "",      "F8.8", 0.0, 127.0,   "°C",    "Current DHW Setpoint (Remote param 0)"),
    ("056W",     "W",  "",      "F8.8", 0.0, 127.0,   "°C",    "DHW Setpoint to set(Remote param 0)"),
    ("057",      "RW", "",      "",     0.0, 0.0,     "°C",    "Max CH water Setpoint (Remote param 1)"),
    ("057R",     "R",  "",      "F8.8", 0.0, 127.0,   "°C",    "Current Max CH water Setpoint (Remote param 1)"),
    ("057W",     "W",  "",      "F8.8", 0.0, 127.0,   "°C",    "Max CH water Setpoint to set (Remote param 1)"),
    ("058",      "RW", "",      "",     0.0, 0.0,     "°C",    "OTC HC Ratio (Remote param 2)"),
    ("058R",     "R",  "",      "F8.8", 0.0, 127.0,   "°C",    "Current OTC HC Ratio (Remote param 2)"),
    ("058W",     "W",  "",      "F8.8", 0.0, 127.0,   "°C",    "OTC HC Ratio to set (Remote param 2)"),
    ("059",      "RW", "",      "",     0.0, 0.0,     "",      "(Remote param 3)"),
    ("059R",     "R",  "",      "F8.8", 0.0, 127.0,   "",      "Current (Remote param 3)"),
    ("059W",     "W",  "",      "F8.8", 0.0, 127.0,   "",      "to set (Remote param 3)"),
    ("060",      "RW", "",      "",     0.0, 0.0,     "",      "(Remote param 4)"),
    ("060R",     "R",  "",      "F8.8", 0.0, 127.0,   "",      "Current (Remote param 4)"),
    ("060W",     "W",  "",      "F8.8", 0.0, 127.0,   "",      "to set (Remote param 4)"),
    ("061",      "RW", "",      "",     0.0, 0.0,     "",      "(Remote param 5)"),
    ("061R",     "R",  "",      "F8.8", 0.0, 127.0,   "",      "Current (Remote param 5)"),
    ("061W",     "W",  "",      "F8.8", 0.0, 127.0,   "",      "to set (Remote param 5)"),
    ("062",      "RW", "",      "",     0.0, 0.0,     "",      "(Remote param 6)"),
    ("062R",     "R",  "",      "F8.8", 0.0, 127.0,   "",      "Current (Remote param 6)"),
    ("062W",     "W",  "",      "F8.8", 0.0, 127.0,   "",      "to set (Remote param 6)"),
    ("063",      "RW", "",      "",     0.0, 0.0,     "",      "(Remote param 7)"),
    ("063R",     "R",  "",      "F8.8", 0.0, 127.0,   "",      "Current (Remote param 7)"),
    ("063W",     "W",  "",      "F8.8", 0.0, 127.0,   "",      "to set (Remote param 7)"),
    ("070",      "R",  "",      "BF",   0.0, 0.0,     "",      "Status ventilation / heat-recovery"),
    ("070:HB0",  "R",  "HB0",   "BF",   0.0, 1.0,     "",      "Master status ventilation / heat-recovery: Ventilation enable"),
    ("070:HB1",  "R",  "HB1",   "BF",   0.0, 1.0,     "",      "Master status ventilation / heat-recovery: Bypass postion"),
    ("070:HB2",  "R",  "HB2",   "BF",   0.0, 1.0,     "",      "Master status ventilation / heat-recovery: Bypass mode"),
    ("070:HB3",  "R",  "HB3",   "BF",   0.0, 1.0,     "",      "Master status ventilation / heat-recovery: Free ventilation mode"),
    ("070:LB0",  "R",  "LB0",   "BF",   0.0, 1.0,     "",      "Slave status ventilation / heat-recovery: Fault indication"),
    ("070:LB1",  "R",  "LB1",   "BF",   0.0, 1.0,     "",      "Slave status ventilation / heat-recovery: Ventilation mode"),
    ("070:LB2",  "R",  "LB2",   "BF",   0.0, 1.0,     "",      "Slave status ventilation / heat-recovery: Bypass status"),
    ("070:LB3",  "R",  "LB3",   "BF",   0.0, 1.0,     "",      "Slave status ventilation / heat-recovery: Bypass automatic status"),
    ("070:LB4",  "R",  "LB4",   "BF",   0.0, 1.0,     "",      "Slave status ventilation / heat-recovery: Free ventilation status"),
    ("070:LB6",  "R",  "LB6",   "BF",   0.0, 1.0,     "",      "Slave status ventilation / heat-recovery: Diagnostic indication"),
    ("071",      "R",  "",      "",     0.0, 0.0,     "",      "Relative ventilation position (0-100%). 0% is the minimum set ventilation and 100% is the maximum set ventilation"),
    ("072",      "R",  "",      "",     0.0, 0.0,     "",      "Application-specific fault flags and OEM fault code ventilation / heat-recovery"),
    ("073",      "R",  "",      "",     0.0, 0.0,     "",      "An OEM-specific diagnostic/service code for ventilation / heat-recovery system"),
    ("074",      "R",  "",      "BF",   0.0, 1.0,     "",      "Slave Configuration ventilation / heat-recovery"),
    ("074:HB0",  "R",  "HB0",   "BF",   0.0, 1.0,     "",      "Ventilation enabled"),
    ("074:HB1",  "R",  "HB1",   "BF",   0.0, 1.0,     "",      "Bypass position"),
    ("074:HB2",  "R",  "HB2",   "BF",   0.0, 1.0,     "",      "Bypass mode"),
    ("074:HB3",  "R",  "HB3",   "BF",   0.0, 1.0,     "",      "Speed control"),
    ("074:LB",   "R",  "0-7",   "U8",   0.0, 255.0,   "",      "Slave MemberID Code ventilation / heat-recovery"),
    ("075",      "R",  "",      "U16",  0.0, 0.0,     "",      "The implemented version of the OpenTherm Protocol Specification in the ventilation / heat-recovery system"),
    ("076",      "R",  "",      "U16",  0.0, 0.0,     "",      "Ventilation / heat-recovery product version number and type"),
    ("077",      "R",  "",      "U16",  0.0, 100.0,   "%",     "Relative ventilation"),
    ("078",      "R",  "",      "U16",  0.0, 100.0,   "%",     "Relative humidity exhaust air"),
    ("079",      "R",  "",      "U16",  0.0, 2000.0,  "ppm",   "CO2 level exhaust air"),
    ("080",      "R",  "",      "U16",  0.0, 0.0,     "°C",    "Supply inlet temperature"),
    ("081",      "R",  "",      "U16",  0.0, 0.0,     "°C",    "Supply outlet temperature"),
    ("082",      "R",  "",      "U16",  0.0, 0.0,     "°C",    "mExhaust inlet temperature"),
    ("083",      "R",  "",      "U16",  0.0, 0.0,     "°C",    "Exhaust outlet temperature"),
    ("084",      "R",  "",      "U16",  0.0, 0.0,     "rpm",   "Exhaust fan speed"),
    ("085",      "R",  "",      "U16",  0.0, 0.0,     "rpm",   "Supply fan speed"),
    ("086",      "R",  "",      "BF",   0.0, 0.0,     "",      "Remote ventilation / heat-recovery parameter:"),
    ("086:HB0",  "R",  "HB0",   "BF",   0.0, 0.0,     "",      "Transfer-enable: Nominal ventilation value"),
    ("086:LB0",  "R",  "LB0",   "BF",   0.0, 0.0,     "",      "Read/write : Nominal ventilation value"),
    ("087",      "R",  "",      "U16",  0.0, 100.0,   "%",     "Nominal relative value for ventilation"),
    ("088",      "R",  "",      "U16",  0.0, 255.0,   "",      "Number of Transparent-Slave-Parameters supported by TSP’s ventilation / heat-recovery"),
    ("089",      "R",  "",      "U16",  0.0, 255.0,   "",      "Index number / Value of referred-to transparent TSP’s ventilation / heat-recovery parameter"),
    ("090",      "R",  "",      "U16",  0.0, 255.0,   "",      "Size of Fault-History-Buffer supported by ventilation / heat-recovery"),
    ("091",      "R",  "",      "U16",  0.0, 255.0,   "",      "Index number / Value of referred-to fault-history buffer entry ventilation / heat-recovery"),
    ("093",      "R",  "",      "U16",  0.0, 65535.0, "",      "Brand Index / Slave Brand name"),
    ("094",      "R",  "",      "U16",  0.0, 65535.0, "",      "Brand Version Index / Slave product type/version"),
    ("095",      "R",  "",      "U16",  0.0, 65535.0, "",      "Brand Serial Number index / Slave product serialnumber"),
    ("098",      "R",  "",      "U16",  0.0, 255.0,   "",      "For a specific RF sensor the RF strength and battery level is written"),
    ("099",      "R",  "",      "U16",  0.0, 255.0,   "",      "Operating Mode HC1, HC2/ Operating Mode DHW"),
    ("100",      "R",  "",      "U16",  0.0, 255.0,   "",      "Function of manual and program changes in master and remote room Setpoint"),
    ("101",      "R",  "",      "BF",   0.0, 0.0,     "",      "Solar Storage:"),
    ("101:HB",   "R",  "8-10",  "U8",   0.0, 0.0,     "",      "Master Solar Storage: Solar mode"),
    ("101:LB0",  "R",  "LB0",   "BF",   0.0, 0.0,     "",      "Slave Solar Storage: Fault indication"),
    ("101:LB1",  "R",  "1-3",   "U8",   0.0, 7.0,     "",      "Slave Solar Storage: Solar mode status"),
    ("101:LB2",  "R",  "4-5",   "U8",   0.0, 3.0,     "",      "Slave Solar Storage: Solar status"),
    ("102",      "R",  "",      "",     0.0, 0.0,     "",      "Application-specific fault flags and OEM fault code Solar Storage"),
    ("103",      "R",  "",      "BF",   0.0, 0.0,     "",      "Slave Configuration Solar Storage"),
    ("103:HB0",  "R",  "HB0",   "BF",   0.0, 0.0,     "",      "System type"),
    ("103:LB",   "R",  "0-7",   "U8",   0.0, 255.0,   "",      "Slave MemberID"),
    ("104",      "R",  "",      "U16",  0.0, 255.0,   "",      "Solar Storage product version number and type"),
    ("105",      "R",  "",      "U16",  0.0, 255.0,   "",      "Number of Transparent-Slave-Parameters supported by TSP’s Solar Storage"),
    ("106",      "R",  "",      "U16",  0.0, 255.0,   "",      "Index number / Value of referred-to transparent TSP’s Solar Storage parameter"),
    ("107",      "R",  "",      "U16",  0.0, 255.0,   "",      "Size of Fault-History-Buffer supported by Solar Storage"),
    ("108",      "R",  "",      "U16",  0.0, 255.0,   "",      "Index number / Value of referred-to fault-history buffer entry Solar Stor"),
    ("109",      "R",  "",      "U16",  0.0, 255.0,   "",      "Electricity producer starts"),
    ("110",      "R",  "",      "U16",  0.0, 255.0,   "",      "Electricity producer hours"),
    ("111",      "R",  "",      "U16",  0.0, 255.0,   "",      "Electricity production"),
    ("112",      "R",  "",      "U16",  0.0, 255.0,   "",      "Cumulativ Electricity production"),
    ("113",      "R",  "",      "U16",  0.0, 255.0,   "",      "Number of un-successful burner starts"),
    ("114",      "R",  "",      "U16",  0.0, 255.0,   "",      "Number of times flame signal was too low"),
    ("115",      "R",  "",      "U16",  0.0, 255.0,   "",      "OEM-specific diagnostic/service code"),
    ("116",      "R",  "",      "U16",  0.0, 65535.0, "",      "Number of succesful starts burner"),
    ("117",      "R",  "",      "U16",  0.0, 65535.0, "",      "Number of starts CH pump"),
    ("118",      "R",  "",      "U16",  0.0, 65535.0, "",      "Number of starts DHW pump/valve"),
    ("119",      "R",  "",      "U16",  0.0, 65535.0, "",      "Number of starts burner during DHW mode"),
    ("120",      "R",  "",      "U16",  0.0, 65535.0, "",      "Number of hours that burner is in operation (i.e. flame on)"),
    ("121",      "R",  "",      "U16",  0.0, 65535.0, "",      "Number of hours that CH pump has been running"),
    ("122",      "R",  "",      "U16",  0.0, 65535.0, "",      "Number of hours that DHW pump has been running or DHW valve has been opened"),
    ("123",      "R",  "",      "U16",  0.0, 65535.0, "",      "Number of hours that burner is in operation during DHW mode"),
    ("124",      "W",  "",      "F8.8", 1.0, 127.0,   "",      "The implemented version of the OpenTherm Protocol Specification in the master"),
    ("125",      "R",  "",      "F8.8", 1.0, 127.0,   "",      "The implemented version of the OpenTherm Protocol Specification in the slave"),
    ("126",      "W",  "",      "BF",   0.0, 0.0,     "",      "Master product version number and type"),
    ("126:HB",   "W",  "8-15",  "U8",   0.0, 255.0,   "",      "Master product version number and type"),
    ("126:LB",   "W",  "0-7",   "U8",   0.0, 255.0,   "",      "Master product version number and type"),
    ("127",      "R",  "",      "BF",   0.0, 0.0,     "",      "Slave product version number and type"),
    ("127:HB",   "R",  "8-15",  "U8",   0.0, 255.0,   "",      "Slave product version number and type"),
    ("127:LB",   "R",  "0-7",   "U8",   0.0, 255.0,   "",      "Slave product version number and type"),
    ("129",      "R",  "",      "U16",  0.0, 65535.0, "",      "BAXI data-id 129"),
    ("130",      "R",  "",      "U16",  0.0, 65535.0, "",      "BAXI data-id 130"),
    ("149",      "R",  "",      "U16",  0.0, 65535.0, "",      "BAXI data-id 149"),
    ("150",      "R",  "",      "U16",  0.0, 65535.0, "",      "BAXI data-id 150"),
    ("151",      "R",  "",      "U16",  0.0, 65535.0, "",      "BAXI data-id 151"),
    ("173",      "R",  "",      "U16",  0.0, 65535.0, "",      "BAXI data-id 173"),
    ("198",      "R",  "",      "U16",  0.0, 65535.0, "",      "BAXI data-id 198"),
    ("199",      "R",  "",      "U16",  0.0, 65535.0, "",      "BAXI data-id 199"),
    ("200",      "R",  "",      "U16",  0.0, 65535.0, "",      "BAXI data-id 200"),
    ("202",      "R",  "",      "U16",  0.0, 65535.0, "",      "BAXI data-id 202"),
    ("203",      "R",  "",      "U16",  0.0, 65535.0, "",      "BAXI data-id 203"),
    ("204",      "R",  "",      "U16",  0.0, 65535.0, "",      "BAXI data-id 204"),
    ("209",      "R",  "",      "U16",  0.0, 65535.0, "",      "BAXI data-id 209"),
];

static REGISTRY: Lazy<HashMap<&'static str, DataPoint>> = Lazy::new(|| {
    ROWS.iter()
        .map(|&(key, dir, pos, fmt, min, max, units, descr)| {
            (
                key,
                DataPoint {
                    dir,
                    pos,
                    fmt: DataFormat::parse(fmt),
                    min,
                    max,
                    units,
                    descr,
                },
            )
        })
        .collect()
});

/// Look up a descriptor by its full dictionary key.
pub fn lookup(key: &str) -> Option<&'static DataPoint> {
    REGISTRY.get(key)
}

/// All known 3-digit data-ids that support reads, in ascending id order.
pub fn readable_ids() -> Vec<&'static str> {
    let mut ids: Vec<&'static str> = ROWS
        .iter()
        .filter(|r| r.0.len() == 3 && r.1.contains('R'))
        .map(|r| r.0)
        .collect();
    ids.sort_unstable();
    ids
}

/// Vendor member-id table (id reported in the MemberId sub-fields).
static MEMBERS: &[(u8, &'static str)] = &[
    (0, "Unspecified"),
    (2, "AWB"),
    (4, "Multibrand"),
    (5, "Itho Daalderop"),
    (6, "Daikin/Ideal"),
    (8, "Biasi/Buderus/Logamax"),
    (9, "Ferroli/Agpo"),
    (11, "De Dietrich/Remeha/Baxi Prime"),
    (13, "Cetetherm"),
    (16, "Unical"),
    (18, "Bosch"),
    (24, "Vaillant/AWB/Bulex"),
    (27, "Baxi"),
    (29, "Daalderop/Itho"),
    (33, "Viessmann"),
    (41, "Radiant"),
    (56, "Baxi Luna"),
    (131, "Netfit/Bosch"),
    (173, "Intergas"),
];

/// Vendor name for a member-id, "UNKNOWN" when unlisted.
pub fn member_name(id: u8) -> &'static str {
    MEMBERS
        .iter()
        .find(|&&(m, _)| m == id)
        .map_or("UNKNOWN", |&(_, name)| name)
}
