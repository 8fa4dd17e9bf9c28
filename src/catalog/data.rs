//! VCC inspection checksheet table (document GR/TD/3434, revision 0).

use super::TestItem;

const fn item(
    id: u32,
    system: &'static str,
    code: &'static str,
    name: &'static str,
    drawing: &'static str,
    expected: &'static str,
) -> TestItem {
    TestItem {
        id,
        system,
        code,
        name,
        drawing,
        expected,
    }
}

pub(super) static TEST_ITEMS: &[TestItem] = &[
    // 4.1 Train System
    item(
        1,
        "Train System",
        "4.1.1",
        "Cab activation and key switch",
        "RS3R-VCC-101",
        "Cab activates only with key in ON; opposite cab locked out",
    ),
    item(
        2,
        "Train System",
        "4.1.2",
        "Battery contactor control",
        "RS3R-VCC-102",
        "Battery contactors close on BATT ON and open on BATT OFF in all cars",
    ),
    item(
        3,
        "Train System",
        "4.1.3",
        "Train line continuity",
        "RS3R-VCC-103",
        "All train lines continuous DMC1 to DMC2, no cross-feed",
    ),
    item(
        4,
        "Train System",
        "4.1.4",
        "Deadman and vigilance circuit",
        "RS3R-VCC-104",
        "Emergency brake applied when master controller released for > 3 s",
    ),
    // 4.2 Interior & Lighting
    item(
        5,
        "Interior & Lighting",
        "4.2.1",
        "Saloon lighting control",
        "RS3R-VCC-201",
        "Saloon lights switch ON/OFF from active cab in all cars",
    ),
    item(
        6,
        "Interior & Lighting",
        "4.2.2",
        "Emergency lighting",
        "RS3R-VCC-202",
        "Emergency lights ON within 1 s of auxiliary supply loss",
    ),
    item(
        7,
        "Interior & Lighting",
        "4.2.3",
        "Head and tail lights",
        "RS3R-VCC-203",
        "Head lights on leading cab, tail lights on trailing cab",
    ),
    // 4.3 Gangway & Coupler
    item(
        8,
        "Gangway & Coupler",
        "4.3.1",
        "Semi-permanent coupler electrical heads",
        "RS3R-VCC-301",
        "Coupler heads seated, no continuity fault reported",
    ),
    item(
        9,
        "Gangway & Coupler",
        "4.3.2",
        "Automatic coupler uncouple interlock",
        "RS3R-VCC-302",
        "Uncouple inhibited while train is in motion",
    ),
    // 4.4 Traction System
    item(
        10,
        "Traction System",
        "4.4.1",
        "Direction controller interlock",
        "RS3R-VCC-401",
        "Direction change inhibited above zero speed",
    ),
    item(
        11,
        "Traction System",
        "4.4.2",
        "Traction enable circuit",
        "RS3R-VCC-402",
        "Traction available only with all doors closed and locked",
    ),
    item(
        12,
        "Traction System",
        "4.4.3",
        "Line breaker control",
        "RS3R-VCC-403",
        "Line breakers close on command and trip on overcurrent test",
    ),
    item(
        13,
        "Traction System",
        "4.4.4",
        "Pantograph / collector shoe control",
        "RS3R-VCC-404",
        "Collector shoes energise in MC1 and MC2 only",
    ),
    // 4.5 Brake System
    item(
        14,
        "Brake System",
        "4.5.1",
        "Service brake application",
        "RS3R-VCC-501",
        "Service brake applies in all cars for each brake step",
    ),
    item(
        15,
        "Brake System",
        "4.5.2",
        "Emergency brake loop",
        "RS3R-VCC-502",
        "Opening the emergency loop applies emergency brake train-wide",
    ),
    item(
        16,
        "Brake System",
        "4.5.3",
        "Parking brake indication",
        "RS3R-VCC-503",
        "Parking brake applied indication shown on cab display",
    ),
    item(
        17,
        "Brake System",
        "4.5.4",
        "Brake release confirmation",
        "RS3R-VCC-504",
        "Brake released lamp lit only when all bogies released",
    ),
    // 4.6 Auxiliary Electric
    item(
        18,
        "Auxiliary Electric",
        "4.6.1",
        "Static inverter start-up",
        "RS3R-VCC-601",
        "SIV starts and outputs 415 V AC within tolerance",
    ),
    item(
        19,
        "Auxiliary Electric",
        "4.6.2",
        "Extension supply changeover",
        "RS3R-VCC-602",
        "Load transferred to healthy SIV on single SIV failure",
    ),
    item(
        20,
        "Auxiliary Electric",
        "4.6.3",
        "Battery charger output",
        "RS3R-VCC-603",
        "Battery charger output 110 V DC nominal",
    ),
    // 4.7 Door System
    item(
        21,
        "Door System",
        "4.7.1",
        "Door open/close and door-closed loop",
        "RS3R-VCC-701",
        "Doors open on enabled side only; door-closed loop made when all doors locked",
    ),
    // 4.8 Air Conditioning
    item(
        22,
        "Air Conditioning",
        "4.8.1",
        "Saloon HVAC mode control",
        "RS3R-VCC-801",
        "HVAC units follow cab mode selection in all cars",
    ),
    item(
        23,
        "Air Conditioning",
        "4.8.2",
        "Emergency ventilation",
        "RS3R-VCC-802",
        "Emergency ventilation runs on battery after auxiliary supply loss",
    ),
    // 4.9 Train Management
    item(
        24,
        "Train Management",
        "4.9.1",
        "TCMS communication check",
        "RS3R-VCC-901",
        "All car control units reported online on cab display",
    ),
    item(
        25,
        "Train Management",
        "4.9.2",
        "Fault log recording",
        "RS3R-VCC-902",
        "Simulated fault logged with correct car and time stamp",
    ),
    // 4.10 Communication Systems
    item(
        26,
        "Communication Systems",
        "4.10.1",
        "Public address announcement",
        "RS3R-VCC-1001",
        "Cab PA audible in all saloons",
    ),
    item(
        27,
        "Communication Systems",
        "4.10.2",
        "Passenger emergency intercom",
        "RS3R-VCC-1002",
        "PEI call raises cab alarm and two-way speech is established",
    ),
    item(
        28,
        "Communication Systems",
        "4.10.3",
        "Cab-to-cab intercom",
        "RS3R-VCC-1003",
        "Two-way speech between DMC1 and DMC2 cabs",
    ),
];
