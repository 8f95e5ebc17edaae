//! Behavioural suites for the line cursor and payload transform.
