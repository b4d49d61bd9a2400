// Translates keycodes into port-bit toggles on `Machine::in_port1`/`in_port2`.
// The crate itself only defines the fixed key set and the bit table; sourcing
// actual key-down/up events is external (minifb's own window polling, used by
// the CLI harness).

use crate::machine::Machine;
use minifb::Key as MinifbKey;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Key {
    Coin,
    P1Start,
    P2Start,
    P1Shoot,
    P1Left,
    P1Right,
    Tilt,
    P2Shoot,
    P2Left,
    P2Right,
}

struct PortBit {
    port: u8,
    bit: u8,
}

fn port_bit(key: Key) -> PortBit {
    match key {
        Key::Coin => PortBit { port: 1, bit: 0 },
        Key::P2Start => PortBit { port: 1, bit: 1 },
        Key::P1Start => PortBit { port: 1, bit: 2 },
        Key::P1Shoot => PortBit { port: 1, bit: 4 },
        Key::P1Left => PortBit { port: 1, bit: 5 },
        Key::P1Right => PortBit { port: 1, bit: 6 },
        Key::Tilt => PortBit { port: 2, bit: 2 },
        Key::P2Shoot => PortBit { port: 2, bit: 4 },
        Key::P2Left => PortBit { port: 2, bit: 5 },
        Key::P2Right => PortBit { port: 2, bit: 6 },
    }
}

fn latch<'a>(machine: &'a mut Machine, port: u8) -> &'a mut u8 {
    match port {
        1 => &mut machine.in_port1,
        2 => &mut machine.in_port2,
        _ => unreachable!("key table only ever names ports 1 and 2"),
    }
}

pub fn key_down(machine: &mut Machine, key: Key) {
    let PortBit { port, bit } = port_bit(key);
    *latch(machine, port) |= 1 << bit;
}

pub fn key_up(machine: &mut Machine, key: Key) {
    let PortBit { port, bit } = port_bit(key);
    *latch(machine, port) &= !(1 << bit);
}

/// Maps the reference implementation's SDL keycodes onto `minifb::Key`.
pub fn from_minifb(key: MinifbKey) -> Option<Key> {
    match key {
        MinifbKey::C => Some(Key::Coin),
        MinifbKey::Key1 => Some(Key::P1Start),
        MinifbKey::Key2 => Some(Key::P2Start),
        MinifbKey::Z => Some(Key::P1Shoot),
        MinifbKey::Left => Some(Key::P1Left),
        MinifbKey::Right => Some(Key::P1Right),
        MinifbKey::D => Some(Key::Tilt),
        MinifbKey::X => Some(Key::P2Shoot),
        MinifbKey::A => Some(Key::P2Left),
        MinifbKey::S => Some(Key::P2Right),
        _ => None,
    }
}

/// Polls the window's current key state and applies every transition since
/// the last poll. Called once per scheduler burst from the CLI harness.
pub fn poll_minifb(machine: &mut Machine, window: &minifb::Window, previous: &mut Vec<MinifbKey>) {
    let current = window.get_keys();
    for &key in current.iter() {
        if !previous.contains(&key) {
            if let Some(mapped) = from_minifb(key) {
                key_down(machine, mapped);
            }
        }
    }
    for key in previous.iter() {
        if !current.contains(key) {
            if let Some(mapped) = from_minifb(*key) {
                key_up(machine, mapped);
            }
        }
    }
    *previous = current;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::Memory;
    use crate::processor::Cpu;
    use crate::state::State;

    fn fresh_machine() -> Machine {
        Machine::new(Cpu::new(State::new(Memory::new())))
    }

    #[test]
    fn coin_sets_and_clears_bit_zero_of_port_one() {
        let mut m = fresh_machine();
        key_down(&mut m, Key::Coin);
        assert_eq!(m.in_port1 & 0x01, 0x01);
        key_up(&mut m, Key::Coin);
        assert_eq!(m.in_port1 & 0x01, 0);
    }

    #[test]
    fn tilt_lands_on_port_two() {
        let mut m = fresh_machine();
        key_down(&mut m, Key::Tilt);
        assert_eq!(m.in_port2 & 0x04, 0x04);
        assert_eq!(m.in_port1, 0);
    }

    #[test]
    fn distinct_keys_do_not_clobber_each_others_bits() {
        let mut m = fresh_machine();
        key_down(&mut m, Key::P1Left);
        key_down(&mut m, Key::P1Right);
        assert_eq!(m.in_port1 & 0x60, 0x60);
        key_up(&mut m, Key::P1Left);
        assert_eq!(m.in_port1 & 0x60, 0x40);
    }
}
