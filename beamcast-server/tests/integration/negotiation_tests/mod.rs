mod test_answer_follows_offer;
mod test_candidates_after_description;
mod test_departure_mid_negotiation;
mod test_endpoint_originates_offer;
mod test_malformed_offer_fails_session;
