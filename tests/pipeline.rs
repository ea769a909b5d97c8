//! Driver behaviour against a simulated chip with a two-command response delay.
//!
//! Run with: cargo test --test pipeline

mod common;

use common::SimulatedRhd;
use intan_rhd::{AmplifierCount, AmplifierPower, AmplifierPowerHigh, ChipId, Config, Device, Reading, Sampler, Slot};

#[test]
fn third_read_reflects_an_earlier_write() {
    let mut chip = SimulatedRhd::new();
    let mut device = Device::new(&mut chip);

    device.send_write(14, 0x5A).unwrap();
    let first = device.send_read(14).unwrap();
    let second = device.send_read(14).unwrap();
    let third = device.send_read(14).unwrap();

    // The first two answer commands sent before them
    assert_eq!(first.bits(), 0x0000);
    assert!(second.is_write_echo());
    assert_eq!(third.register_value(), 0x5A);
}

#[test]
fn read_register_value_drains_the_pipeline() {
    let mut chip = SimulatedRhd::new();
    chip.registers[7] = 0x3C;
    let mut device = Device::new(&mut chip);

    assert_eq!(device.read_register_value(7).unwrap(), 0x3C);
    assert_eq!(chip.received, vec![0xC700; 3]);
}

#[test]
fn set_amp_power_preserves_other_bits() {
    let mut chip = SimulatedRhd::new();
    chip.registers[14] = 0b0010_0000;
    chip.registers[15] = 0b0000_0001;
    let mut device = Device::new(&mut chip);

    let state = device.set_amp_power(true, true).unwrap();
    assert!(state.first && state.second);
    assert_eq!(device.power_state(), &state);

    assert_eq!(chip.registers[14], 0b0010_0001);
    assert_eq!(chip.registers[15], 0b1000_0001);
}

#[test]
fn set_amp_power_is_idempotent() {
    let mut chip = SimulatedRhd::new();
    chip.registers[14] = 0b0100_0000;
    let mut device = Device::new(&mut chip);

    let once = device.set_amp_power(true, false).unwrap();
    let twice = device.set_amp_power(true, false).unwrap();
    assert_eq!(once, twice);

    assert_eq!(chip.registers[14], 0b0100_0001);
    assert_eq!(chip.registers[15], 0);
    assert_eq!(chip.writes(), vec![0x8E41, 0x8E41]);
}

#[test]
fn two_channels_in_one_bank_both_stay_powered() {
    let mut chip = SimulatedRhd::new();
    let config = Config::default().with_channels(2, 5).unwrap();
    let mut device = Device::with_config(&mut chip, config);

    device.set_amp_power(true, true).unwrap();

    assert_eq!(chip.registers[14], 0b0010_0100);
    assert_eq!(chip.writes(), vec![0x8E04, 0x8E24]);
}

#[test]
fn disabled_channels_are_never_written() {
    let mut chip = SimulatedRhd::new();
    chip.registers[14] = 0xF0;
    let mut device = Device::new(&mut chip);

    let state = device.set_amp_power(false, false).unwrap();
    assert!(!state.first && !state.second);

    assert!(chip.writes().is_empty());
    assert_eq!(chip.registers[14], 0xF0);
    assert_eq!(chip.received.len(), 6);
}

#[test]
fn calibration_clocks_nine_dummy_commands() {
    let mut chip = SimulatedRhd::new();
    let mut device = Device::new(&mut chip);

    device.calibrate().unwrap();

    assert_eq!(chip.received.len(), 10);
    assert_eq!(chip.received[0], 0x5500);
    assert!(chip.received[1..].iter().all(|&frame| frame >> 14 == 0b11));
}

#[test]
fn sampler_alternates_and_gates_disabled_channels() {
    let mut chip = SimulatedRhd::new();
    let mut device = Device::new(&mut chip);
    device.set_amp_power(true, false).unwrap();
    device.calibrate().unwrap();

    let mut sampler = Sampler::new(device.config());
    assert_eq!(sampler.tick_budget_us(), 500);

    // Two ticks fill the pipeline with this sampler's conversions
    assert_eq!(sampler.tick(&mut device).unwrap(), None);
    assert_eq!(sampler.tick(&mut device).unwrap(), None);

    let first = SimulatedRhd::sample_for(0) as i16;
    assert_eq!(
        sampler.tick(&mut device).unwrap(),
        Some(Reading { slot: Slot::First, value: first })
    );
    assert_eq!(
        sampler.tick(&mut device).unwrap(),
        Some(Reading { slot: Slot::Second, value: 0 })
    );
    assert_eq!(sampler.latest(Slot::First), first);
    assert_eq!(sampler.next_slot(), Slot::First);

    let converts: Vec<u16> = chip
        .received
        .iter()
        .copied()
        .filter(|frame| frame >> 14 == 0b00)
        .collect();
    assert_eq!(converts, vec![0x0000, 0x0F00, 0x0000, 0x0F00]);
}

#[test]
fn priming_resets_both_filters_without_recording() {
    let mut chip = SimulatedRhd::new();
    let mut device = Device::new(&mut chip);
    device.set_amp_power(true, true).unwrap();

    let mut sampler = Sampler::new(device.config());
    sampler.prime(&mut device).unwrap();

    // The pipeline now holds the priming conversions, which are dropped
    assert_eq!(sampler.tick(&mut device).unwrap(), None);
    assert_eq!(sampler.tick(&mut device).unwrap(), None);
    let reading = sampler.tick(&mut device).unwrap().unwrap();
    assert_eq!(reading.slot, Slot::First);
    assert_eq!(reading.value, SimulatedRhd::sample_for(0) as i16);

    assert_eq!(chip.filter_resets, vec![0, 15]);
}

#[test]
fn identification_registers() {
    let mut chip = SimulatedRhd::new();
    let mut device = Device::new(&mut chip);

    assert_eq!(device.read_company_id().unwrap(), *b"INTAN");
    assert_eq!(device.verify_chip().unwrap(), ChipId::Rhd2216);
    assert_eq!(device.read_register::<AmplifierCount>().unwrap().count, 16);
    assert_eq!(device.read_amplifier_count().unwrap(), 16);
    assert_eq!(ChipId::Rhd2216.amplifiers(), 16);
}

#[test]
fn modify_register_round_trips_through_the_chip() {
    let mut chip = SimulatedRhd::new();
    chip.registers[15] = 0b0000_0110;
    let mut device = Device::new(&mut chip);

    let written = device
        .modify_register::<AmplifierPowerHigh, _>(|mut reg| {
            reg.enabled.remove(AmplifierPower::AMP1);
            reg.enabled.insert(AmplifierPower::AMP7);
            reg
        })
        .unwrap();
    assert_eq!(written.enabled.bits(), 0b1000_0100);
    assert_eq!(
        device.read_register::<AmplifierPowerHigh>().unwrap(),
        written
    );

    assert_eq!(chip.registers[15], 0b1000_0100);
}
